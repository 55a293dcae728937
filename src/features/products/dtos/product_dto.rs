use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::brands::dtos::BrandSummaryDto;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::models::{
    ProductAttributeInput, ProductImageInput, ProductInput, ProductStatus,
};
use crate::features::products::pricing::StockStatus;
use crate::features::products::search::{
    PageWindow, ProductOrdering, SearchCriteria, SortBy, SortDirection,
};
use crate::shared::serde_helpers::empty_string_as_none;
use crate::shared::validation::{validate_price, validate_rating, SKU_REGEX};

// =============================================================================
// SEARCH
// =============================================================================

/// Query params for product search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductSearchQuery {
    /// Free text matched against product, category and brand names and the description
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub query: Option<String>,
    #[serde(default, alias = "category_id", deserialize_with = "empty_string_as_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, alias = "brand_id", deserialize_with = "empty_string_as_none")]
    pub brand_id: Option<Uuid>,
    #[serde(default, alias = "min_price", deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(default, alias = "max_price", deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Only products whose original price is above the current price
    #[serde(default, alias = "on_sale", deserialize_with = "empty_string_as_none")]
    pub on_sale: Option<bool>,
    /// Only products with stock left
    #[serde(default, alias = "in_stock", deserialize_with = "empty_string_as_none")]
    pub in_stock: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub featured: Option<bool>,
    /// name, price, rating, newest or popularity (default: name)
    #[serde(default, alias = "sort_by", deserialize_with = "empty_string_as_none")]
    pub sort_by: Option<String>,
    /// asc or desc (default: asc). Ignored for newest and popularity.
    #[serde(default, alias = "sort_direction", deserialize_with = "empty_string_as_none")]
    pub sort_direction: Option<String>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Items per page (default: 12)
    #[serde(default, alias = "page_size", deserialize_with = "empty_string_as_none")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl ProductSearchQuery {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            text: SearchCriteria::normalize_text(self.query.as_deref()),
            category_id: self.category_id,
            brand_id: self.brand_id,
            min_price: self.min_price,
            max_price: self.max_price,
            on_sale: self.on_sale.unwrap_or(false),
            in_stock: self.in_stock.unwrap_or(false),
            featured: self.featured.unwrap_or(false),
        }
    }

    pub fn ordering(&self) -> ProductOrdering {
        ProductOrdering::for_sort(
            SortBy::parse(self.sort_by.as_deref()),
            SortDirection::parse(self.sort_direction.as_deref()),
        )
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }
}

/// Query params for the featured products listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedQuery {
    /// Number of products (default: 8, max: 50)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(minimum = 1, maximum = 50)]
    pub count: Option<i64>,
}

/// Paginated search result with facets and price bounds
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchResponseDto {
    pub products: Vec<ProductSummaryDto>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub page_size: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    /// Active categories that have at least one active product
    pub available_categories: Vec<CategorySummaryDto>,
    /// Active brands that have at least one active product
    pub available_brands: Vec<BrandSummaryDto>,
    /// Lowest price across all active products
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Highest price across all active products
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
}

// =============================================================================
// PRODUCT RESPONSES
// =============================================================================

/// Product as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub original_price: Option<Decimal>,
    pub is_on_sale: bool,
    /// Percentage off the original price, two decimals
    #[schema(value_type = Option<String>)]
    pub discount_percentage: Option<Decimal>,
    pub stock_quantity: i32,
    pub is_in_stock: bool,
    pub is_low_stock: bool,
    pub stock_status: StockStatus,
    pub is_featured: bool,
    pub main_image_url: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub category: CategorySummaryDto,
    pub brand: Option<BrandSummaryDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageDto {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_main: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributeDto {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub display_order: i32,
}

/// Full product view including images and attributes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDto {
    #[serde(flatten)]
    pub summary: ProductSummaryDto,
    pub detailed_description: Option<String>,
    pub low_stock_threshold: i32,
    pub status: ProductStatus,
    pub view_count: i32,
    pub images: Vec<ProductImageDto>,
    pub attributes: Vec<ProductAttributeDto>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// PRODUCT REQUESTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageRequestDto {
    #[validate(
        url(message = "Image URL must be a valid URL"),
        length(max = 255, message = "Image URL must not exceed 255 characters")
    )]
    pub image_url: String,

    #[validate(length(max = 200, message = "Alt text must not exceed 200 characters"))]
    pub alt_text: Option<String>,

    #[serde(default)]
    pub display_order: i32,

    #[serde(default)]
    pub is_main: bool,
}

impl From<ProductImageRequestDto> for ProductImageInput {
    fn from(dto: ProductImageRequestDto) -> Self {
        Self {
            image_url: dto.image_url,
            alt_text: dto.alt_text,
            display_order: dto.display_order,
            is_main: dto.is_main,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributeRequestDto {
    #[validate(length(min = 1, max = 100, message = "Attribute name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 500, message = "Attribute value must be 1-500 characters"))]
    pub value: String,

    #[serde(default)]
    pub display_order: i32,
}

impl From<ProductAttributeRequestDto> for ProductAttributeInput {
    fn from(dto: ProductAttributeRequestDto) -> Self {
        Self {
            name: dto.name,
            value: dto.value,
            display_order: dto.display_order,
        }
    }
}

fn default_status() -> ProductStatus {
    ProductStatus::Draft
}

/// Request DTO for creating a product or replacing all of its fields
///
/// On update, `images` and `attributes` replace the current sets only when
/// present. `rating` and `reviewCount` keep their current values when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequestDto {
    pub category_id: Uuid,

    pub brand_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,

    pub detailed_description: Option<String>,

    #[validate(
        length(min = 1, max = 50, message = "SKU must be 1-50 characters"),
        regex(path = *SKU_REGEX, message = "SKU must be uppercase letters and digits in hyphen-separated segments (e.g. 'TSHIRT-RED-M')")
    )]
    pub sku: String,

    #[schema(value_type = String, example = "19.99")]
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[schema(value_type = Option<String>, example = "24.99")]
    #[validate(custom(function = "validate_price"))]
    pub original_price: Option<Decimal>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock quantity must not be negative"))]
    pub stock_quantity: i32,

    /// Defaults to the configured low-stock threshold
    #[validate(range(min = 0, message = "Low stock threshold must not be negative"))]
    pub low_stock_threshold: Option<i32>,

    #[serde(default = "default_status")]
    pub status: ProductStatus,

    #[serde(default)]
    pub is_featured: bool,

    #[validate(
        url(message = "Main image URL must be a valid URL"),
        length(max = 255, message = "Main image URL must not exceed 255 characters")
    )]
    pub main_image_url: Option<String>,

    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<f64>,

    #[validate(range(min = 0, message = "Review count must not be negative"))]
    pub review_count: Option<i32>,

    #[validate(nested)]
    pub images: Option<Vec<ProductImageRequestDto>>,

    #[validate(nested)]
    pub attributes: Option<Vec<ProductAttributeRequestDto>>,
}

/// A product request split into storage inputs
pub struct ProductWrite {
    pub input: ProductInput,
    pub images: Option<Vec<ProductImageInput>>,
    pub attributes: Option<Vec<ProductAttributeInput>>,
}

impl ProductRequestDto {
    /// Convert into storage inputs. `rating` and `review_count` fall back to
    /// `current` (the stored values on update, zero on create).
    pub fn into_write(self, default_low_stock_threshold: i32, current: (f64, i32)) -> ProductWrite {
        let (current_rating, current_reviews) = current;
        ProductWrite {
            input: ProductInput {
                category_id: self.category_id,
                brand_id: self.brand_id,
                name: self.name.trim().to_string(),
                description: self.description,
                detailed_description: self.detailed_description,
                sku: self.sku,
                price: self.price,
                original_price: self.original_price,
                stock_quantity: self.stock_quantity,
                low_stock_threshold: self
                    .low_stock_threshold
                    .unwrap_or(default_low_stock_threshold),
                status: self.status,
                is_featured: self.is_featured,
                main_image_url: self.main_image_url,
                rating: self.rating.unwrap_or(current_rating),
                review_count: self.review_count.unwrap_or(current_reviews),
            },
            images: self
                .images
                .map(|images| images.into_iter().map(Into::into).collect()),
            attributes: self
                .attributes
                .map(|attributes| attributes.into_iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> serde_json::Value {
        json!({
            "categoryId": Uuid::nil(),
            "name": "Trail Runner",
            "sku": "SHOE-TR-42",
            "price": "89.90"
        })
    }

    #[test]
    fn test_request_defaults() {
        let dto: ProductRequestDto = serde_json::from_value(valid_request()).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.status, ProductStatus::Draft);

        let write = dto.into_write(10, (0.0, 0));
        assert_eq!(write.input.low_stock_threshold, 10);
        assert_eq!(write.input.stock_quantity, 0);
        assert!(write.images.is_none());
        assert!(write.attributes.is_none());
    }

    #[test]
    fn test_request_rejects_negative_price_and_bad_sku() {
        let mut body = valid_request();
        body["price"] = json!("-1.00");
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());

        let mut body = valid_request();
        body["sku"] = json!("shoe tr");
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_request_rejects_price_beyond_storage_range() {
        let mut body = valid_request();
        body["price"] = json!("10000000000000000.00");
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        let mut body = valid_request();
        body["originalPrice"] = json!("99999999999999999");
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());

        let mut body = valid_request();
        body["price"] = json!("9999999999999999.99");
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_request_validates_nested_attributes() {
        let mut body = valid_request();
        body["attributes"] = json!([{ "name": "Color", "value": "" }]);
        let dto: ProductRequestDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_rating_falls_back_to_current() {
        let dto: ProductRequestDto = serde_json::from_value(valid_request()).unwrap();
        let write = dto.into_write(10, (4.5, 12));
        assert_eq!(write.input.rating, 4.5);
        assert_eq!(write.input.review_count, 12);
    }

    #[test]
    fn test_search_query_accepts_both_casings() {
        let camel: ProductSearchQuery =
            serde_json::from_value(json!({ "sortBy": "price", "pageSize": "5" })).unwrap();
        let snake: ProductSearchQuery =
            serde_json::from_value(json!({ "sort_by": "price", "page_size": "5" })).unwrap();

        assert_eq!(camel.ordering(), snake.ordering());
        assert_eq!(camel.window(), snake.window());
        assert_eq!(camel.window().page_size, 5);
    }

    #[test]
    fn test_search_query_blank_text_is_no_filter() {
        let query = ProductSearchQuery {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.criteria(), SearchCriteria::default());
    }
}
