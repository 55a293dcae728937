use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductImageInput {
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_main: bool,
}
