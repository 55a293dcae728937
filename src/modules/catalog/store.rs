use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::brands::models::{Brand, BrandInput};
use crate::features::categories::models::{Category, CategoryInput};
use crate::features::products::models::{
    PriceBounds, ProductAttribute, ProductAttributeInput, ProductImage, ProductImageInput,
    ProductInput, ProductListing,
};
use crate::features::products::search::{PageWindow, ProductOrdering, SearchCriteria};

/// Repository operations over the catalog.
///
/// Every fetch is explicit: callers ask for exactly the rows and joined
/// summaries they need. Uniqueness and referential violations surface as
/// `AppError::Conflict`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Categories

    /// All categories (or only active ones), ordered by display order, name, id
    async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>>;

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>>;

    async fn insert_category(&self, input: &CategoryInput) -> Result<Category>;

    /// Replace editable fields. `None` when the category does not exist.
    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> Result<Option<Category>>;

    async fn delete_category(&self, id: Uuid) -> Result<bool>;

    async fn count_child_categories(&self, id: Uuid) -> Result<i64>;

    /// Products of any status referencing the category
    async fn count_products_in_category(&self, id: Uuid) -> Result<i64>;

    /// Active product count keyed by category id (categories without any are absent)
    async fn count_active_products_by_category(&self) -> Result<HashMap<Uuid, i64>>;

    // Brands

    /// All brands (or only active ones), ordered by name, id
    async fn list_brands(&self, include_inactive: bool) -> Result<Vec<Brand>>;

    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>>;

    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand>;

    async fn update_brand(&self, id: Uuid, input: &BrandInput) -> Result<Option<Brand>>;

    async fn delete_brand(&self, id: Uuid) -> Result<bool>;

    /// Products of any status referencing the brand
    async fn count_products_for_brand(&self, id: Uuid) -> Result<i64>;

    async fn count_active_products_by_brand(&self) -> Result<HashMap<Uuid, i64>>;

    // Products

    /// Product of any status joined with its category and brand summary
    async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>>;

    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> Result<bool>;

    /// Insert a product with its images and attributes atomically
    async fn insert_product(
        &self,
        input: &ProductInput,
        images: &[ProductImageInput],
        attributes: &[ProductAttributeInput],
    ) -> Result<Uuid>;

    /// Replace editable product fields. Images and attributes are replaced
    /// only when supplied. Returns `false` when the product does not exist.
    async fn update_product(
        &self,
        id: Uuid,
        input: &ProductInput,
        images: Option<&[ProductImageInput]>,
        attributes: Option<&[ProductAttributeInput]>,
    ) -> Result<bool>;

    /// Hard delete, cascading to images and attributes
    async fn delete_product(&self, id: Uuid) -> Result<bool>;

    async fn list_product_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>>;

    async fn list_product_attributes(&self, product_id: Uuid) -> Result<Vec<ProductAttribute>>;

    async fn increment_view_count(&self, id: Uuid) -> Result<()>;

    // Search

    /// Listed products matching the criteria, before pagination
    async fn count_products(&self, criteria: &SearchCriteria) -> Result<i64>;

    async fn search_products(
        &self,
        criteria: &SearchCriteria,
        ordering: &ProductOrdering,
        window: PageWindow,
    ) -> Result<Vec<ProductListing>>;

    /// Active categories with at least one listed product, ordered by name, id
    async fn list_categories_with_active_products(&self) -> Result<Vec<Category>>;

    /// Active brands with at least one listed product, ordered by name, id
    async fn list_brands_with_active_products(&self) -> Result<Vec<Brand>>;

    /// Price range across all listed products
    async fn active_price_bounds(&self) -> Result<PriceBounds>;
}
