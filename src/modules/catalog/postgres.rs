use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::brands::models::{Brand, BrandInput};
use crate::features::categories::models::{Category, CategoryInput};
use crate::features::categories::tree::{would_create_cycle, InvalidParent};
use crate::features::products::models::{
    PriceBounds, ProductAttribute, ProductAttributeInput, ProductImage, ProductImageInput,
    ProductInput, ProductListing,
};
use crate::features::products::search::{PageWindow, ProductOrdering, SearchCriteria};
use crate::modules::catalog::store::CatalogStore;

const CATEGORY_COLUMNS: &str =
    "c.id, c.parent_id, c.name, c.description, c.image_url, c.display_order, c.is_active, c.created_at, c.updated_at";

const BRAND_COLUMNS: &str =
    "b.id, b.name, b.description, b.logo_url, b.website, b.is_active, b.created_at, b.updated_at";

const LISTING_SELECT: &str = r#"
    SELECT p.id, p.category_id, p.brand_id, p.name, p.description, p.detailed_description,
           p.sku, p.price, p.original_price, p.stock_quantity, p.low_stock_threshold,
           p.status, p.is_featured, p.main_image_url, p.rating, p.review_count, p.view_count,
           p.created_at, p.updated_at,
           c.name AS category_name, c.image_url AS category_image_url,
           b.name AS brand_name, b.logo_url AS brand_logo_url
    FROM products p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN brands b ON b.id = p.brand_id
"#;

const LISTING_FROM: &str = r#"
    FROM products p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN brands b ON b.id = p.brand_id
"#;

/// Map constraint violations to conflicts, everything else to a database error
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();

        // Unique violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return match constraint {
                "products_sku_unique" => {
                    AppError::Conflict("A product with this SKU already exists".to_string())
                }
                "brands_name_unique_when_active" => AppError::Conflict(
                    "An active brand with this name already exists".to_string(),
                ),
                _ => AppError::Conflict("Record already exists".to_string()),
            };
        }

        // Foreign key violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::Conflict(
                "Record references, or is referenced by, another record".to_string(),
            );
        }

        // Check violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23514")) {
            return AppError::Validation(format!("Constraint '{}' violated", constraint));
        }

        // Numeric value out of range
        if db_err.code() == Some(std::borrow::Cow::Borrowed("22003")) {
            return AppError::Validation("Numeric value out of range".to_string());
        }
    }

    tracing::error!("Catalog query failed: {:?}", e);
    AppError::Database(e)
}

/// Listed-product predicate plus the optional filters, all ANDed
fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, criteria: &SearchCriteria) {
    builder.push(" WHERE p.status = 'active'");

    if let Some(pattern) = criteria.like_pattern() {
        builder
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = criteria.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(brand_id) = criteria.brand_id {
        builder.push(" AND p.brand_id = ").push_bind(brand_id);
    }
    if let Some(min_price) = criteria.min_price {
        builder.push(" AND p.price >= ").push_bind(min_price);
    }
    if let Some(max_price) = criteria.max_price {
        builder.push(" AND p.price <= ").push_bind(max_price);
    }
    if criteria.on_sale {
        builder.push(" AND p.original_price IS NOT NULL AND p.original_price > p.price");
    }
    if criteria.in_stock {
        builder.push(" AND p.stock_quantity > 0");
    }
    if criteria.featured {
        builder.push(" AND p.is_featured = TRUE");
    }
}

fn build_count_query(criteria: &SearchCriteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*)");
    builder.push(LISTING_FROM);
    push_filters(&mut builder, criteria);
    builder
}

fn build_search_query(
    criteria: &SearchCriteria,
    ordering: &ProductOrdering,
    window: PageWindow,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(LISTING_SELECT);
    push_filters(&mut builder, criteria);
    builder.push(" ORDER BY ").push(ordering.to_sql());
    builder
        .push(" LIMIT ")
        .push_bind(window.limit())
        .push(" OFFSET ")
        .push_bind(window.offset());
    builder
}

/// PostgreSQL-backed catalog store
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_images(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        product_id: Uuid,
        images: &[ProductImageInput],
    ) -> Result<()> {
        for image in images {
            sqlx::query(
                r#"
                INSERT INTO product_images (id, product_id, image_url, alt_text, display_order, is_main)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(product_id)
            .bind(&image.image_url)
            .bind(&image.alt_text)
            .bind(image.display_order)
            .bind(image.is_main)
            .execute(&mut **tx)
            .await
            .map_err(handle_db_error)?;
        }
        Ok(())
    }

    async fn insert_attributes(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        product_id: Uuid,
        attributes: &[ProductAttributeInput],
    ) -> Result<()> {
        for attribute in attributes {
            sqlx::query(
                r#"
                INSERT INTO product_attributes (id, product_id, name, value, display_order)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(product_id)
            .bind(&attribute.name)
            .bind(&attribute.value)
            .bind(attribute.display_order)
            .execute(&mut **tx)
            .await
            .map_err(handle_db_error)?;
        }
        Ok(())
    }

    async fn count(&self, sql: &str, id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn grouped_counts(&self, sql: &str) -> Result<HashMap<Uuid, i64>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories c
            WHERE ($1 OR c.is_active = TRUE)
            ORDER BY c.display_order, LOWER(c.name), c.id
            "#
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn insert_category(&self, input: &CategoryInput) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, parent_id, name, description, image_url, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> Result<Option<Category>> {
        let mut tx = self.pool.begin().await.map_err(handle_db_error)?;

        // Serializes concurrent reparents; plain reads are not blocked
        sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(handle_db_error)?;

        if let Some(parent_id) = input.parent_id {
            let parents: HashMap<Uuid, Option<Uuid>> =
                sqlx::query_as::<_, (Uuid, Option<Uuid>)>("SELECT id, parent_id FROM categories")
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(handle_db_error)?
                    .into_iter()
                    .collect();
            if would_create_cycle(id, parent_id, &parents) {
                return Err(InvalidParent::Cycle(parent_id).into());
            }
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, description = $4, image_url = $5,
                display_order = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        tx.commit().await.map_err(handle_db_error)?;
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_child_categories(&self, id: Uuid) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM categories WHERE parent_id = $1", id)
            .await
    }

    async fn count_products_in_category(&self, id: Uuid) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM products WHERE category_id = $1", id)
            .await
    }

    async fn count_active_products_by_category(&self) -> Result<HashMap<Uuid, i64>> {
        self.grouped_counts(
            r#"
            SELECT category_id, COUNT(*)
            FROM products
            WHERE status = 'active'
            GROUP BY category_id
            "#,
        )
        .await
    }

    async fn list_brands(&self, include_inactive: bool) -> Result<Vec<Brand>> {
        let sql = format!(
            r#"
            SELECT {BRAND_COLUMNS}
            FROM brands b
            WHERE ($1 OR b.is_active = TRUE)
            ORDER BY LOWER(b.name), b.id
            "#
        );
        sqlx::query_as::<_, Brand>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        let sql = format!("SELECT {BRAND_COLUMNS} FROM brands b WHERE b.id = $1");
        sqlx::query_as::<_, Brand>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand> {
        sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (id, name, description, logo_url, website, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, logo_url, website, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.logo_url)
        .bind(&input.website)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn update_brand(&self, id: Uuid, input: &BrandInput) -> Result<Option<Brand>> {
        sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands
            SET name = $2, description = $3, logo_url = $4, website = $5,
                is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, logo_url, website, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.logo_url)
        .bind(&input.website)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn delete_brand(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products_for_brand(&self, id: Uuid) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM products WHERE brand_id = $1", id)
            .await
    }

    async fn count_active_products_by_brand(&self) -> Result<HashMap<Uuid, i64>> {
        self.grouped_counts(
            r#"
            SELECT brand_id, COUNT(*)
            FROM products
            WHERE status = 'active' AND brand_id IS NOT NULL
            GROUP BY brand_id
            "#,
        )
        .await
    }

    async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>> {
        let sql = format!("{LISTING_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProductListing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM products
                WHERE sku = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn insert_product(
        &self,
        input: &ProductInput,
        images: &[ProductImageInput],
        attributes: &[ProductAttributeInput],
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let mut tx = self.pool.begin().await.map_err(handle_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, brand_id, name, description, detailed_description, sku,
                price, original_price, stock_quantity, low_stock_threshold, status,
                is_featured, main_image_url, rating, review_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.detailed_description)
        .bind(&input.sku)
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.stock_quantity)
        .bind(input.low_stock_threshold)
        .bind(input.status)
        .bind(input.is_featured)
        .bind(&input.main_image_url)
        .bind(input.rating)
        .bind(input.review_count)
        .execute(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        Self::insert_images(&mut tx, id, images).await?;
        Self::insert_attributes(&mut tx, id, attributes).await?;

        tx.commit().await.map_err(handle_db_error)?;
        Ok(id)
    }

    async fn update_product(
        &self,
        id: Uuid,
        input: &ProductInput,
        images: Option<&[ProductImageInput]>,
        attributes: Option<&[ProductAttributeInput]>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(handle_db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET category_id = $2, brand_id = $3, name = $4, description = $5,
                detailed_description = $6, sku = $7, price = $8, original_price = $9,
                stock_quantity = $10, low_stock_threshold = $11, status = $12,
                is_featured = $13, main_image_url = $14, rating = $15, review_count = $16,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.detailed_description)
        .bind(&input.sku)
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.stock_quantity)
        .bind(input.low_stock_threshold)
        .bind(input.status)
        .bind(input.is_featured)
        .bind(&input.main_image_url)
        .bind(input.rating)
        .bind(input.review_count)
        .execute(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(images) = images {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(handle_db_error)?;
            Self::insert_images(&mut tx, id, images).await?;
        }
        if let Some(attributes) = attributes {
            sqlx::query("DELETE FROM product_attributes WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(handle_db_error)?;
            Self::insert_attributes(&mut tx, id, attributes).await?;
        }

        tx.commit().await.map_err(handle_db_error)?;
        Ok(true)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_product_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>> {
        sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, image_url, alt_text, display_order, is_main, created_at
            FROM product_images
            WHERE product_id = $1
            ORDER BY display_order, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn list_product_attributes(&self, product_id: Uuid) -> Result<Vec<ProductAttribute>> {
        sqlx::query_as::<_, ProductAttribute>(
            r#"
            SELECT id, product_id, name, value, display_order, created_at
            FROM product_attributes
            WHERE product_id = $1
            ORDER BY display_order, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE products SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;
        Ok(())
    }

    async fn count_products(&self, criteria: &SearchCriteria) -> Result<i64> {
        build_count_query(criteria)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn search_products(
        &self,
        criteria: &SearchCriteria,
        ordering: &ProductOrdering,
        window: PageWindow,
    ) -> Result<Vec<ProductListing>> {
        build_search_query(criteria, ordering, window)
            .build_query_as::<ProductListing>()
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn list_categories_with_active_products(&self) -> Result<Vec<Category>> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories c
            WHERE c.is_active = TRUE
              AND EXISTS (
                  SELECT 1 FROM products p
                  WHERE p.category_id = c.id AND p.status = 'active'
              )
            ORDER BY LOWER(c.name), c.id
            "#
        );
        sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn list_brands_with_active_products(&self) -> Result<Vec<Brand>> {
        let sql = format!(
            r#"
            SELECT {BRAND_COLUMNS}
            FROM brands b
            WHERE b.is_active = TRUE
              AND EXISTS (
                  SELECT 1 FROM products p
                  WHERE p.brand_id = b.id AND p.status = 'active'
              )
            ORDER BY LOWER(b.name), b.id
            "#
        );
        sqlx::query_as::<_, Brand>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn active_price_bounds(&self) -> Result<PriceBounds> {
        sqlx::query_as::<_, PriceBounds>(
            r#"
            SELECT MIN(price) AS min_price, MAX(price) AS max_price
            FROM products
            WHERE status = 'active'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }
}
