use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product lifecycle status matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Active,
    Inactive,
    OutOfStock,
}

impl ProductStatus {
    /// Only active products are visible on public catalog paths
    pub fn is_listed(&self) -> bool {
        match self {
            ProductStatus::Active => true,
            ProductStatus::Draft | ProductStatus::Inactive | ProductStatus::OutOfStock => false,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Inactive => write!(f, "inactive"),
            ProductStatus::OutOfStock => write!(f, "out_of_stock"),
        }
    }
}

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub main_image_url: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a product or replacing all of its editable fields
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub main_image_url: Option<String>,
    pub rating: f64,
    pub review_count: i32,
}

/// Product row joined with the summary columns of its category and brand
#[derive(Debug, Clone, FromRow)]
pub struct ProductListing {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: String,
    pub category_image_url: Option<String>,
    pub brand_name: Option<String>,
    pub brand_logo_url: Option<String>,
}

/// Lowest and highest current price across listed products
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct PriceBounds {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}
