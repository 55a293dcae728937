use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::brands::dtos::BrandSummaryDto;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::dtos::{
    ProductDetailDto, ProductRequestDto, ProductSearchQuery, ProductSearchResponseDto,
    ProductSummaryDto,
};
use crate::features::products::mapper::{to_detail, to_summary};
use crate::features::products::models::{ProductInput, ProductListing};
use crate::features::products::search::{PageInfo, PageWindow, ProductOrdering, SearchCriteria};
use crate::modules::catalog::CatalogStore;
use crate::shared::constants::{DEFAULT_FEATURED_COUNT, MAX_FEATURED_COUNT};

/// Service for product search, detail and admin maintenance
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
    default_low_stock_threshold: i32,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>, default_low_stock_threshold: i32) -> Self {
        Self {
            store,
            default_low_stock_threshold,
        }
    }

    /// Filtered, sorted, paginated search over listed products
    pub async fn search(&self, query: &ProductSearchQuery) -> Result<ProductSearchResponseDto> {
        self.run_search(query.criteria(), query.ordering(), query.window())
            .await
    }

    /// Search with the category filter fixed to `category_id`
    pub async fn search_in_category(
        &self,
        category_id: Uuid,
        query: &ProductSearchQuery,
    ) -> Result<ProductSearchResponseDto> {
        if self.store.find_category(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }

        let criteria = SearchCriteria {
            category_id: Some(category_id),
            ..query.criteria()
        };
        self.run_search(criteria, query.ordering(), query.window())
            .await
    }

    /// Search with the brand filter fixed to `brand_id`
    pub async fn search_in_brand(
        &self,
        brand_id: Uuid,
        query: &ProductSearchQuery,
    ) -> Result<ProductSearchResponseDto> {
        if self.store.find_brand(brand_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Brand {} not found", brand_id)));
        }

        let criteria = SearchCriteria {
            brand_id: Some(brand_id),
            ..query.criteria()
        };
        self.run_search(criteria, query.ordering(), query.window())
            .await
    }

    /// Listed featured products, best rated first
    pub async fn featured(&self, count: Option<i64>) -> Result<Vec<ProductSummaryDto>> {
        let count = count
            .unwrap_or(DEFAULT_FEATURED_COUNT)
            .clamp(1, MAX_FEATURED_COUNT) as u32;

        let criteria = SearchCriteria {
            featured: true,
            ..Default::default()
        };
        let listings = self
            .store
            .search_products(
                &criteria,
                &ProductOrdering::featured(),
                PageWindow::first(count),
            )
            .await?;

        Ok(listings.into_iter().map(to_summary).collect())
    }

    /// Detail of a listed product. Bumps the view counter in the background.
    pub async fn get_public_detail(&self, id: Uuid) -> Result<ProductDetailDto> {
        let listing = self
            .store
            .find_product_listing(id)
            .await?
            .filter(|l| l.product.status.is_listed())
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.increment_view_count(id).await {
                tracing::warn!(product_id = %id, error = %e, "Failed to record product view");
            }
        });

        self.detail_of(listing).await
    }

    /// Detail of a product in any status
    pub async fn get_admin_detail(&self, id: Uuid) -> Result<ProductDetailDto> {
        let listing = self
            .store
            .find_product_listing(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        self.detail_of(listing).await
    }

    pub async fn create(&self, dto: ProductRequestDto) -> Result<ProductDetailDto> {
        let write = dto.into_write(self.default_low_stock_threshold, (0.0, 0));
        self.check_references(&write.input).await?;
        self.check_sku(&write.input.sku, None).await?;

        let id = self
            .store
            .insert_product(
                &write.input,
                write.images.as_deref().unwrap_or_default(),
                write.attributes.as_deref().unwrap_or_default(),
            )
            .await?;
        tracing::info!(product_id = %id, sku = %write.input.sku, "Product created");

        self.get_admin_detail(id).await
    }

    /// Replace a product. Images and attributes are replaced only when the
    /// request carries them; rating and review count survive when omitted.
    pub async fn update(&self, id: Uuid, dto: ProductRequestDto) -> Result<ProductDetailDto> {
        let existing = self
            .store
            .find_product_listing(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        let write = dto.into_write(
            self.default_low_stock_threshold,
            (existing.product.rating, existing.product.review_count),
        );
        self.check_references(&write.input).await?;
        self.check_sku(&write.input.sku, Some(id)).await?;

        let updated = self
            .store
            .update_product(
                id,
                &write.input,
                write.images.as_deref(),
                write.attributes.as_deref(),
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        tracing::info!(product_id = %id, "Product updated");

        self.get_admin_detail(id).await
    }

    /// Hard delete, images and attributes included
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_product(id).await? {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn run_search(
        &self,
        criteria: SearchCriteria,
        ordering: ProductOrdering,
        window: PageWindow,
    ) -> Result<ProductSearchResponseDto> {
        let (total_count, listings, categories, brands, bounds) = futures::try_join!(
            self.store.count_products(&criteria),
            self.store.search_products(&criteria, &ordering, window),
            self.store.list_categories_with_active_products(),
            self.store.list_brands_with_active_products(),
            self.store.active_price_bounds(),
        )?;

        let info = PageInfo::new(total_count, window);
        Ok(ProductSearchResponseDto {
            products: listings.into_iter().map(to_summary).collect(),
            total_count: info.total_count,
            total_pages: info.total_pages,
            current_page: info.current_page,
            page_size: info.page_size,
            has_previous_page: info.has_previous_page,
            has_next_page: info.has_next_page,
            available_categories: categories.iter().map(CategorySummaryDto::from).collect(),
            available_brands: brands.iter().map(BrandSummaryDto::from).collect(),
            min_price: bounds.min_price,
            max_price: bounds.max_price,
        })
    }

    async fn detail_of(&self, listing: ProductListing) -> Result<ProductDetailDto> {
        let id = listing.product.id;
        let (images, attributes) = futures::try_join!(
            self.store.list_product_images(id),
            self.store.list_product_attributes(id),
        )?;
        Ok(to_detail(listing, images, attributes))
    }

    /// Products may only point at an existing active category and brand
    async fn check_references(&self, input: &ProductInput) -> Result<()> {
        match self.store.find_category(input.category_id).await? {
            Some(c) if c.is_active => {}
            Some(_) => {
                return Err(AppError::Validation(format!(
                    "Category {} is inactive",
                    input.category_id
                )))
            }
            None => {
                return Err(AppError::Validation(format!(
                    "Category {} does not exist",
                    input.category_id
                )))
            }
        }

        if let Some(brand_id) = input.brand_id {
            match self.store.find_brand(brand_id).await? {
                Some(b) if b.is_active => {}
                Some(_) => {
                    return Err(AppError::Validation(format!(
                        "Brand {} is inactive",
                        brand_id
                    )))
                }
                None => {
                    return Err(AppError::Validation(format!(
                        "Brand {} does not exist",
                        brand_id
                    )))
                }
            }
        }

        Ok(())
    }

    async fn check_sku(&self, sku: &str, exclude: Option<Uuid>) -> Result<()> {
        if self.store.sku_exists(sku, exclude).await? {
            return Err(AppError::Conflict(format!(
                "Product with SKU '{}' already exists",
                sku
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::brands::models::BrandInput;
    use crate::features::categories::models::CategoryInput;
    use crate::features::categories::CategoryService;
    use crate::features::products::dtos::ProductImageRequestDto;
    use crate::features::products::models::ProductStatus;
    use crate::modules::catalog::MemoryCatalogStore;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<dyn CatalogStore>,
        service: ProductService,
        category_id: Uuid,
        brand_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
        let category = store
            .insert_category(&CategoryInput {
                parent_id: None,
                name: "Outdoor".to_string(),
                description: None,
                image_url: None,
                display_order: 0,
                is_active: true,
            })
            .await
            .unwrap();
        let brand = store
            .insert_brand(&BrandInput {
                name: "Summit".to_string(),
                description: None,
                logo_url: None,
                website: None,
                is_active: true,
            })
            .await
            .unwrap();

        Fixture {
            service: ProductService::new(store.clone(), 10),
            store,
            category_id: category.id,
            brand_id: brand.id,
        }
    }

    fn request(category_id: Uuid, sku: &str, price: i64) -> ProductRequestDto {
        ProductRequestDto {
            category_id,
            brand_id: None,
            name: format!("Item {}", sku),
            description: Some(Sentence(3..6).fake()),
            detailed_description: None,
            sku: sku.to_string(),
            price: Decimal::new(price, 0),
            original_price: None,
            stock_quantity: 5,
            low_stock_threshold: None,
            status: ProductStatus::Active,
            is_featured: false,
            main_image_url: None,
            rating: None,
            review_count: None,
            images: None,
            attributes: None,
        }
    }

    fn page_query(page: i64, page_size: i64) -> ProductSearchQuery {
        ProductSearchQuery {
            page: Some(page),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_search() {
        let f = fixture().await;
        let result = f.service.search(&ProductSearchQuery::default()).await.unwrap();

        assert!(result.products.is_empty());
        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_pages, 0);
        assert_eq!(result.current_page, 1);
        assert!(!result.has_previous_page);
        assert!(!result.has_next_page);
        assert!(result.available_categories.is_empty());
        assert!(result.available_brands.is_empty());
        assert!(result.min_price.is_none());
        assert!(result.max_price.is_none());
    }

    #[tokio::test]
    async fn test_pagination_metadata() {
        let f = fixture().await;
        for i in 0..25 {
            f.service
                .create(request(f.category_id, &format!("SKU-{:02}", i), 10 + i))
                .await
                .unwrap();
        }

        let page3 = f.service.search(&page_query(3, 10)).await.unwrap();
        assert_eq!(page3.products.len(), 5);
        assert_eq!(page3.total_count, 25);
        assert_eq!(page3.total_pages, 3);
        assert!(page3.has_previous_page);
        assert!(!page3.has_next_page);

        let beyond = f.service.search(&page_query(9, 10)).await.unwrap();
        assert!(beyond.products.is_empty());
        assert_eq!(beyond.total_count, 25);
        assert_eq!(beyond.current_page, 9);
    }

    #[tokio::test]
    async fn test_facets_ignore_filters() {
        let f = fixture().await;
        let mut branded = request(f.category_id, "BRANDED-1", 50);
        branded.brand_id = Some(f.brand_id);
        f.service.create(branded).await.unwrap();
        f.service
            .create(request(f.category_id, "PLAIN-1", 5))
            .await
            .unwrap();

        let query = ProductSearchQuery {
            query: Some("no such product".to_string()),
            ..Default::default()
        };
        let result = f.service.search(&query).await.unwrap();

        assert_eq!(result.total_count, 0);
        assert_eq!(result.available_categories.len(), 1);
        assert_eq!(result.available_brands.len(), 1);
        assert_eq!(result.min_price, Some(Decimal::new(5, 0)));
        assert_eq!(result.max_price, Some(Decimal::new(50, 0)));
    }

    #[tokio::test]
    async fn test_price_range_then_category_narrows_results() {
        let f = fixture().await;
        let other = f
            .store
            .insert_category(&CategoryInput {
                parent_id: None,
                name: "Garden".to_string(),
                description: None,
                image_url: None,
                display_order: 1,
                is_active: true,
            })
            .await
            .unwrap();

        for (sku, price) in [("P-5", 5), ("P-10", 10), ("P-15", 15), ("P-20", 20), ("P-25", 25)] {
            f.service
                .create(request(f.category_id, sku, price))
                .await
                .unwrap();
        }
        f.service
            .create(request(other.id, "G-12", 12))
            .await
            .unwrap();

        let mut query = ProductSearchQuery {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(20, 0)),
            sort_by: Some("price".to_string()),
            ..Default::default()
        };
        let in_range = f.service.search(&query).await.unwrap();
        let skus: Vec<&str> = in_range.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["P-10", "G-12", "P-15", "P-20"]);

        query.category_id = Some(f.category_id);
        let narrowed = f.service.search(&query).await.unwrap();
        let skus: Vec<&str> = narrowed.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["P-10", "P-15", "P-20"]);
        assert_eq!(narrowed.total_count, 3);

        // Bounds describe the whole listed catalog, not the filtered page
        assert_eq!(narrowed.min_price, Some(Decimal::new(5, 0)));
        assert_eq!(narrowed.max_price, Some(Decimal::new(25, 0)));
    }

    #[tokio::test]
    async fn test_draft_hidden_from_public_paths() {
        let f = fixture().await;
        let mut draft = request(f.category_id, "DRAFT-1", 20);
        draft.status = ProductStatus::Draft;
        draft.is_featured = true;
        let created = f.service.create(draft).await.unwrap();

        let result = f.service.search(&ProductSearchQuery::default()).await.unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.available_categories.is_empty());
        assert!(f.service.featured(None).await.unwrap().is_empty());
        assert!(matches!(
            f.service.get_public_detail(created.summary.id).await,
            Err(AppError::NotFound(_))
        ));

        let admin = f.service.get_admin_detail(created.summary.id).await.unwrap();
        assert_eq!(admin.status, ProductStatus::Draft);
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_conflict() {
        let f = fixture().await;
        let first = f
            .service
            .create(request(f.category_id, "DUP-1", 10))
            .await
            .unwrap();
        let second = f
            .service
            .create(request(f.category_id, "DUP-2", 10))
            .await
            .unwrap();

        assert!(matches!(
            f.service.create(request(f.category_id, "DUP-1", 12)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            f.service
                .update(second.summary.id, request(f.category_id, "DUP-1", 12))
                .await,
            Err(AppError::Conflict(_))
        ));

        // Keeping its own SKU is not a conflict
        let updated = f
            .service
            .update(first.summary.id, request(f.category_id, "DUP-1", 15))
            .await
            .unwrap();
        assert_eq!(updated.summary.price, Decimal::new(15, 0));
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_references_rejected() {
        let f = fixture().await;

        let missing = f.service.create(request(Uuid::now_v7(), "REF-1", 10)).await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let mut unknown_brand = request(f.category_id, "REF-2", 10);
        unknown_brand.brand_id = Some(Uuid::now_v7());
        assert!(matches!(
            f.service.create(unknown_brand).await,
            Err(AppError::Validation(_))
        ));

        let inactive = f
            .store
            .insert_category(&CategoryInput {
                parent_id: None,
                name: "Retired".to_string(),
                description: None,
                image_url: None,
                display_order: 0,
                is_active: false,
            })
            .await
            .unwrap();
        assert!(matches!(
            f.service.create(request(inactive.id, "REF-3", 10)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_images_unless_supplied() {
        let f = fixture().await;
        let mut with_images = request(f.category_id, "IMG-1", 30);
        with_images.images = Some(vec![ProductImageRequestDto {
            image_url: "https://cdn.example.com/a.jpg".to_string(),
            alt_text: None,
            display_order: 0,
            is_main: true,
        }]);
        let created = f.service.create(with_images).await.unwrap();
        assert_eq!(created.images.len(), 1);
        assert_eq!(
            created.summary.main_image_url.as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );

        let id = created.summary.id;
        let kept = f
            .service
            .update(id, request(f.category_id, "IMG-1", 35))
            .await
            .unwrap();
        assert_eq!(kept.images.len(), 1);

        let mut cleared = request(f.category_id, "IMG-1", 35);
        cleared.images = Some(vec![]);
        let cleared = f.service.update(id, cleared).await.unwrap();
        assert!(cleared.images.is_empty());
    }

    #[tokio::test]
    async fn test_category_with_product_cannot_be_deleted() {
        let f = fixture().await;
        let product = f
            .service
            .create(request(f.category_id, "GUARD-1", 10))
            .await
            .unwrap();

        let categories = CategoryService::new(f.store.clone());
        assert!(matches!(
            categories.delete(f.category_id).await,
            Err(AppError::Conflict(_))
        ));

        f.service.delete(product.summary.id).await.unwrap();
        categories.delete(f.category_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_scoped_listing_requires_existing_parent() {
        let f = fixture().await;
        let mut branded = request(f.category_id, "SCOPE-1", 10);
        branded.brand_id = Some(f.brand_id);
        f.service.create(branded).await.unwrap();
        f.service
            .create(request(f.category_id, "SCOPE-2", 10))
            .await
            .unwrap();

        let in_brand = f
            .service
            .search_in_brand(f.brand_id, &ProductSearchQuery::default())
            .await
            .unwrap();
        assert_eq!(in_brand.total_count, 1);

        // Path filter wins over the query string
        let query = ProductSearchQuery {
            category_id: Some(Uuid::now_v7()),
            ..Default::default()
        };
        let in_category = f
            .service
            .search_in_category(f.category_id, &query)
            .await
            .unwrap();
        assert_eq!(in_category.total_count, 2);

        assert!(matches!(
            f.service
                .search_in_category(Uuid::now_v7(), &ProductSearchQuery::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_featured_count_is_clamped() {
        let f = fixture().await;
        for i in 0..3 {
            let mut featured = request(f.category_id, &format!("FEAT-{}", i), 10);
            featured.is_featured = true;
            featured.rating = Some(i as f64);
            f.service.create(featured).await.unwrap();
        }

        let top = f.service.featured(Some(0)).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].sku, "FEAT-2");

        assert_eq!(f.service.featured(Some(500)).await.unwrap().len(), 3);
    }
}
