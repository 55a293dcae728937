use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::brands::models::{Brand, BrandInput};
use crate::features::categories::models::{Category, CategoryInput};
use crate::features::categories::tree::{sibling_order, would_create_cycle, InvalidParent};
use crate::features::products::models::{
    PriceBounds, Product, ProductAttribute, ProductAttributeInput, ProductImage,
    ProductImageInput, ProductInput, ProductListing, ProductStatus,
};
use crate::features::products::search::{
    paginate_in_memory, PageWindow, ProductOrdering, SearchCriteria,
};
use crate::modules::catalog::store::CatalogStore;

#[derive(Default)]
struct CatalogState {
    categories: HashMap<Uuid, Category>,
    brands: HashMap<Uuid, Brand>,
    products: HashMap<Uuid, Product>,
    images: Vec<ProductImage>,
    attributes: Vec<ProductAttribute>,
}

impl CatalogState {
    fn listing(&self, product: &Product) -> Option<ProductListing> {
        // A product always references an existing category; mirror the inner join
        let category = self.categories.get(&product.category_id)?;
        let brand = product.brand_id.and_then(|id| self.brands.get(&id));

        Some(ProductListing {
            product: product.clone(),
            category_name: category.name.clone(),
            category_image_url: category.image_url.clone(),
            brand_name: brand.map(|b| b.name.clone()),
            brand_logo_url: brand.and_then(|b| b.logo_url.clone()),
        })
    }

    fn listings(&self) -> Vec<ProductListing> {
        self.products
            .values()
            .filter_map(|product| self.listing(product))
            .collect()
    }

    fn listed_products(&self) -> impl Iterator<Item = &Product> {
        self.products.values().filter(|p| p.status.is_listed())
    }

    fn ensure_brand_name_free(&self, input: &BrandInput, exclude: Option<Uuid>) -> Result<()> {
        if !input.is_active {
            return Ok(());
        }
        let name = input.name.to_lowercase();
        let taken = self
            .brands
            .values()
            .any(|b| b.is_active && Some(b.id) != exclude && b.name.to_lowercase() == name);
        if taken {
            return Err(AppError::Conflict(
                "An active brand with this name already exists".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_sku_free(&self, sku: &str, exclude: Option<Uuid>) -> Result<()> {
        if self
            .products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != exclude)
        {
            return Err(AppError::Conflict(
                "A product with this SKU already exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Same referential rules the foreign keys enforce in Postgres
    fn ensure_product_references(&self, input: &ProductInput) -> Result<()> {
        let category_missing = !self.categories.contains_key(&input.category_id);
        let brand_missing = input
            .brand_id
            .is_some_and(|id| !self.brands.contains_key(&id));
        if category_missing || brand_missing {
            return Err(AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            ));
        }
        Ok(())
    }

    fn replace_images(&mut self, product_id: Uuid, images: &[ProductImageInput]) {
        self.images.retain(|i| i.product_id != product_id);
        let now = Utc::now();
        self.images.extend(images.iter().map(|image| ProductImage {
            id: Uuid::now_v7(),
            product_id,
            image_url: image.image_url.clone(),
            alt_text: image.alt_text.clone(),
            display_order: image.display_order,
            is_main: image.is_main,
            created_at: now,
        }));
    }

    fn replace_attributes(&mut self, product_id: Uuid, attributes: &[ProductAttributeInput]) {
        self.attributes.retain(|a| a.product_id != product_id);
        let now = Utc::now();
        self.attributes
            .extend(attributes.iter().map(|attribute| ProductAttribute {
                id: Uuid::now_v7(),
                product_id,
                name: attribute.name.clone(),
                value: attribute.value.clone(),
                display_order: attribute.display_order,
                created_at: now,
            }));
    }
}

fn apply_product_input(product: &mut Product, input: &ProductInput) {
    product.category_id = input.category_id;
    product.brand_id = input.brand_id;
    product.name = input.name.clone();
    product.description = input.description.clone();
    product.detailed_description = input.detailed_description.clone();
    product.sku = input.sku.clone();
    product.price = input.price;
    product.original_price = input.original_price;
    product.stock_quantity = input.stock_quantity;
    product.low_stock_threshold = input.low_stock_threshold;
    product.status = input.status;
    product.is_featured = input.is_featured;
    product.main_image_url = input.main_image_url.clone();
    product.rating = input.rating;
    product.review_count = input.review_count;
}

fn by_name_then_id(a_name: &str, a_id: Uuid, b_name: &str, b_id: Uuid) -> std::cmp::Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_id.cmp(&b_id))
}

/// Owned in-memory catalog for demo mode and tests.
///
/// Access is serialized through a single `RwLock`; each trait call is
/// atomic with respect to the others.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| include_inactive || c.is_active)
            .cloned()
            .collect();
        categories.sort_by(sibling_order);
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn insert_category(&self, input: &CategoryInput) -> Result<Category> {
        let mut state = self.state.write().await;
        if input
            .parent_id
            .is_some_and(|id| !state.categories.contains_key(&id))
        {
            return Err(AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            ));
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            parent_id: input.parent_id,
            name: input.name.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            display_order: input.display_order,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> Result<Option<Category>> {
        let mut state = self.state.write().await;
        if input
            .parent_id
            .is_some_and(|parent| !state.categories.contains_key(&parent))
        {
            return Err(AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            ));
        }
        if !state.categories.contains_key(&id) {
            return Ok(None);
        }

        // Cycle check and write happen under the same lock
        if let Some(parent_id) = input.parent_id {
            let parents: HashMap<Uuid, Option<Uuid>> = state
                .categories
                .values()
                .map(|c| (c.id, c.parent_id))
                .collect();
            if would_create_cycle(id, parent_id, &parents) {
                return Err(InvalidParent::Cycle(parent_id).into());
            }
        }

        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.parent_id = input.parent_id;
        category.name = input.name.clone();
        category.description = input.description.clone();
        category.image_url = input.image_url.clone();
        category.display_order = input.display_order;
        category.is_active = input.is_active;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let referenced = state.categories.values().any(|c| c.parent_id == Some(id))
            || state.products.values().any(|p| p.category_id == id);
        if referenced {
            return Err(AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            ));
        }
        Ok(state.categories.remove(&id).is_some())
    }

    async fn count_child_categories(&self, id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as i64)
    }

    async fn count_products_in_category(&self, id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count() as i64)
    }

    async fn count_active_products_by_category(&self) -> Result<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for product in state.listed_products() {
            *counts.entry(product.category_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_brands(&self, include_inactive: bool) -> Result<Vec<Brand>> {
        let state = self.state.read().await;
        let mut brands: Vec<Brand> = state
            .brands
            .values()
            .filter(|b| include_inactive || b.is_active)
            .cloned()
            .collect();
        brands.sort_by(|a, b| by_name_then_id(&a.name, a.id, &b.name, b.id));
        Ok(brands)
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        Ok(self.state.read().await.brands.get(&id).cloned())
    }

    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand> {
        let mut state = self.state.write().await;
        state.ensure_brand_name_free(input, None)?;

        let now = Utc::now();
        let brand = Brand {
            id: Uuid::now_v7(),
            name: input.name.clone(),
            description: input.description.clone(),
            logo_url: input.logo_url.clone(),
            website: input.website.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.brands.insert(brand.id, brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, id: Uuid, input: &BrandInput) -> Result<Option<Brand>> {
        let mut state = self.state.write().await;
        if !state.brands.contains_key(&id) {
            return Ok(None);
        }
        state.ensure_brand_name_free(input, Some(id))?;

        let Some(brand) = state.brands.get_mut(&id) else {
            return Ok(None);
        };
        brand.name = input.name.clone();
        brand.description = input.description.clone();
        brand.logo_url = input.logo_url.clone();
        brand.website = input.website.clone();
        brand.is_active = input.is_active;
        brand.updated_at = Utc::now();
        Ok(Some(brand.clone()))
    }

    async fn delete_brand(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.brand_id == Some(id)) {
            return Err(AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            ));
        }
        Ok(state.brands.remove(&id).is_some())
    }

    async fn count_products_for_brand(&self, id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.brand_id == Some(id))
            .count() as i64)
    }

    async fn count_active_products_by_brand(&self) -> Result<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for brand_id in state.listed_products().filter_map(|p| p.brand_id) {
            *counts.entry(brand_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .get(&id)
            .and_then(|product| state.listing(product)))
    }

    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.ensure_sku_free(sku, exclude).is_err())
    }

    async fn insert_product(
        &self,
        input: &ProductInput,
        images: &[ProductImageInput],
        attributes: &[ProductAttributeInput],
    ) -> Result<Uuid> {
        let mut state = self.state.write().await;
        state.ensure_sku_free(&input.sku, None)?;
        state.ensure_product_references(input)?;

        let now = Utc::now();
        let mut product = Product {
            id: Uuid::now_v7(),
            category_id: input.category_id,
            brand_id: None,
            name: String::new(),
            description: None,
            detailed_description: None,
            sku: String::new(),
            price: input.price,
            original_price: None,
            stock_quantity: 0,
            low_stock_threshold: 0,
            status: ProductStatus::Draft,
            is_featured: false,
            main_image_url: None,
            rating: 0.0,
            review_count: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        apply_product_input(&mut product, input);

        let id = product.id;
        state.products.insert(id, product);
        state.replace_images(id, images);
        state.replace_attributes(id, attributes);
        Ok(id)
    }

    async fn update_product(
        &self,
        id: Uuid,
        input: &ProductInput,
        images: Option<&[ProductImageInput]>,
        attributes: Option<&[ProductAttributeInput]>,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&id) {
            return Ok(false);
        }
        state.ensure_sku_free(&input.sku, Some(id))?;
        state.ensure_product_references(input)?;

        if let Some(product) = state.products.get_mut(&id) {
            apply_product_input(product, input);
            product.updated_at = Utc::now();
        }
        if let Some(images) = images {
            state.replace_images(id, images);
        }
        if let Some(attributes) = attributes {
            state.replace_attributes(id, attributes);
        }
        Ok(true)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.products.remove(&id).is_none() {
            return Ok(false);
        }
        state.images.retain(|i| i.product_id != id);
        state.attributes.retain(|a| a.product_id != id);
        Ok(true)
    }

    async fn list_product_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>> {
        let state = self.state.read().await;
        let mut images: Vec<ProductImage> = state
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(images)
    }

    async fn list_product_attributes(&self, product_id: Uuid) -> Result<Vec<ProductAttribute>> {
        let state = self.state.read().await;
        let mut attributes: Vec<ProductAttribute> = state
            .attributes
            .iter()
            .filter(|a| a.product_id == product_id)
            .cloned()
            .collect();
        attributes.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(attributes)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(product) = state.products.get_mut(&id) {
            product.view_count = product.view_count.saturating_add(1);
        }
        Ok(())
    }

    async fn count_products(&self, criteria: &SearchCriteria) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .listings()
            .iter()
            .filter(|listing| criteria.matches(listing))
            .count() as i64)
    }

    async fn search_products(
        &self,
        criteria: &SearchCriteria,
        ordering: &ProductOrdering,
        window: PageWindow,
    ) -> Result<Vec<ProductListing>> {
        let listings = self.state.read().await.listings();
        let (_, page) = paginate_in_memory(listings, criteria, ordering, window);
        Ok(page)
    }

    async fn list_categories_with_active_products(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.is_active && state.listed_products().any(|p| p.category_id == c.id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| by_name_then_id(&a.name, a.id, &b.name, b.id));
        Ok(categories)
    }

    async fn list_brands_with_active_products(&self) -> Result<Vec<Brand>> {
        let state = self.state.read().await;
        let mut brands: Vec<Brand> = state
            .brands
            .values()
            .filter(|b| b.is_active && state.listed_products().any(|p| p.brand_id == Some(b.id)))
            .cloned()
            .collect();
        brands.sort_by(|a, b| by_name_then_id(&a.name, a.id, &b.name, b.id));
        Ok(brands)
    }

    async fn active_price_bounds(&self) -> Result<PriceBounds> {
        let state = self.state.read().await;
        Ok(PriceBounds {
            min_price: state.listed_products().map(|p| p.price).min(),
            max_price: state.listed_products().map(|p| p.price).max(),
        })
    }
}
