use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Free-form descriptive name/value pair
#[derive(Debug, Clone, FromRow)]
pub struct ProductAttribute {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub value: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductAttributeInput {
    pub name: String,
    pub value: String,
    pub display_order: i32,
}
