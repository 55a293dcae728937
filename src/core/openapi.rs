use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::brands::{dtos as brands_dtos, handlers as brands_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::products::{
    dtos as products_dtos, handlers as products_handlers, models as products_models,
    pricing::StockStatus,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Brands
        brands_handlers::list_brands,
        brands_handlers::get_brand,
        brands_handlers::create_brand,
        brands_handlers::update_brand,
        brands_handlers::delete_brand,
        // Products (public)
        products_handlers::search_products,
        products_handlers::featured_products,
        products_handlers::get_product,
        products_handlers::list_category_products,
        products_handlers::list_brand_products,
        // Products (admin)
        products_handlers::create_product,
        products_handlers::get_admin_product,
        products_handlers::update_product,
        products_handlers::delete_product,
    ),
    components(
        schemas(
            Meta,
            // Categories
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryRequestDto,
            categories_handlers::CategoryListing,
            ApiResponse<categories_handlers::CategoryListing>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            // Brands
            brands_dtos::BrandSummaryDto,
            brands_dtos::BrandResponseDto,
            brands_dtos::BrandRequestDto,
            ApiResponse<Vec<brands_dtos::BrandResponseDto>>,
            ApiResponse<brands_dtos::BrandResponseDto>,
            // Products
            products_models::ProductStatus,
            StockStatus,
            products_dtos::ProductSummaryDto,
            products_dtos::ProductDetailDto,
            products_dtos::ProductImageDto,
            products_dtos::ProductAttributeDto,
            products_dtos::ProductSearchResponseDto,
            products_dtos::ProductRequestDto,
            products_dtos::ProductImageRequestDto,
            products_dtos::ProductAttributeRequestDto,
            ApiResponse<products_dtos::ProductSearchResponseDto>,
            ApiResponse<Vec<products_dtos::ProductSummaryDto>>,
            ApiResponse<products_dtos::ProductDetailDto>,
        )
    ),
    tags(
        (name = "categories", description = "Category tree and category management"),
        (name = "brands", description = "Brands and brand management"),
        (name = "products", description = "Product search, detail and product management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Catalog and product search API",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/products",
            "/api/products/featured",
            "/api/products/{id}",
            "/api/categories/{id}/products",
            "/api/admin/products/{id}",
            "/api/admin/brands",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Shop".to_string(),
            version: "2.0.0".to_string(),
            description: "Docs".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Shop");
        assert_eq!(doc.info.description.as_deref(), Some("Docs"));
    }
}
