use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryInput};
use crate::features::categories::tree::CategoryNode;
use crate::shared::serde_helpers::blank_as_false;

/// Category reference nested in product responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummaryDto {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
}

impl From<&Category> for CategorySummaryDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            image_url: c.image_url.clone(),
        }
    }
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    /// Number of active products directly in this category
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponseDto {
    pub fn new(c: Category, product_count: i64) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            product_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Category with its parent's name and direct children
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub parent_name: Option<String>,
    pub children: Vec<CategoryResponseDto>,
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub product_count: i64,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Convert built tree nodes, attaching product counts by category id
    pub fn from_nodes(
        nodes: Vec<CategoryNode>,
        counts: &std::collections::HashMap<Uuid, i64>,
    ) -> Vec<CategoryTreeDto> {
        nodes
            .into_iter()
            .map(|node| {
                let c = node.category;
                CategoryTreeDto {
                    id: c.id,
                    parent_id: c.parent_id,
                    name: c.name,
                    description: c.description,
                    image_url: c.image_url,
                    display_order: c.display_order,
                    is_active: c.is_active,
                    product_count: counts.get(&c.id).copied().unwrap_or(0),
                    children: Self::from_nodes(node.children, counts),
                }
            })
            .collect()
    }
}

fn default_true() -> bool {
    true
}

/// Request DTO for creating or replacing a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequestDto {
    /// Parent category; omit for a root category
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(
        url(message = "Image URL must be a valid URL"),
        length(max = 255, message = "Image URL must not exceed 255 characters")
    )]
    pub image_url: Option<String>,

    #[serde(default)]
    pub display_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CategoryRequestDto {
    pub fn into_input(self) -> CategoryInput {
        CategoryInput {
            parent_id: self.parent_id,
            name: self.name.trim().to_string(),
            description: self.description,
            image_url: self.image_url,
            display_order: self.display_order,
            is_active: self.is_active,
        }
    }
}

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesQuery {
    /// Include inactive categories. Default: false
    #[serde(default, alias = "include_inactive", deserialize_with = "blank_as_false")]
    pub include_inactive: bool,
    /// Return a flat ordered list instead of the tree. Default: false
    #[serde(default, deserialize_with = "blank_as_false")]
    pub flat: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let dto: CategoryRequestDto = serde_json::from_value(serde_json::json!({
            "name": "Phones"
        }))
        .unwrap();
        assert!(dto.is_active);
        assert_eq!(dto.display_order, 0);
        assert!(dto.parent_id.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_empty_name() {
        let dto: CategoryRequestDto = serde_json::from_value(serde_json::json!({
            "name": ""
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_detail_flattens_category_fields() {
        let now = Utc::now();
        let detail = CategoryDetailDto {
            category: CategoryResponseDto {
                id: Uuid::nil(),
                parent_id: None,
                name: "Phones".to_string(),
                description: None,
                image_url: None,
                display_order: 1,
                is_active: true,
                product_count: 3,
                created_at: now,
                updated_at: now,
            },
            parent_name: Some("Electronics".to_string()),
            children: vec![],
        };
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["name"], "Phones");
        assert_eq!(value["productCount"], 3);
        assert_eq!(value["parentName"], "Electronics");
    }
}
