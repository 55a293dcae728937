use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::brands::models::{Brand, BrandInput};
use crate::shared::serde_helpers::blank_as_false;

/// Brand reference nested in product responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<&Brand> for BrandSummaryDto {
    fn from(b: &Brand) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            logo_url: b.logo_url.clone(),
        }
    }
}

/// Response DTO for brand
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    /// Number of active products of this brand
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandResponseDto {
    pub fn new(b: Brand, product_count: i64) -> Self {
        Self {
            id: b.id,
            name: b.name,
            description: b.description,
            logo_url: b.logo_url,
            website: b.website,
            is_active: b.is_active,
            product_count,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Request DTO for creating or replacing a brand
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandRequestDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(
        url(message = "Logo URL must be a valid URL"),
        length(max = 255, message = "Logo URL must not exceed 255 characters")
    )]
    pub logo_url: Option<String>,

    #[validate(
        url(message = "Website must be a valid URL"),
        length(max = 255, message = "Website must not exceed 255 characters")
    )]
    pub website: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl BrandRequestDto {
    pub fn into_input(self) -> BrandInput {
        BrandInput {
            name: self.name.trim().to_string(),
            description: self.description,
            logo_url: self.logo_url,
            website: self.website,
            is_active: self.is_active,
        }
    }
}

/// Query params for listing brands
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBrandsQuery {
    /// Include inactive brands. Default: false
    #[serde(default, alias = "include_inactive", deserialize_with = "blank_as_false")]
    pub include_inactive: bool,
}
