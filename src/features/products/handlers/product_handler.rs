use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::products::dtos::{
    FeaturedQuery, ProductDetailDto, ProductRequestDto, ProductSearchQuery,
    ProductSearchResponseDto, ProductSummaryDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::ApiResponse;

// =============================================================================
// PUBLIC
// =============================================================================

/// Search active products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductSearchQuery),
    responses(
        (status = 200, description = "Search result with facets", body = ApiResponse<ProductSearchResponseDto>),
    ),
    tag = "products"
)]
pub async fn search_products(
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<ProductSearchQuery>,
) -> Result<Json<ApiResponse<ProductSearchResponseDto>>> {
    let result = service.search(&query).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

/// Featured active products, best rated first
#[utoipa::path(
    get,
    path = "/api/products/featured",
    params(FeaturedQuery),
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<Vec<ProductSummaryDto>>),
    ),
    tag = "products"
)]
pub async fn featured_products(
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<FeaturedQuery>,
) -> Result<Json<ApiResponse<Vec<ProductSummaryDto>>>> {
    let products = service.featured(query.count).await?;
    Ok(Json(ApiResponse::list(products)))
}

/// Get an active product with images and attributes
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found or not active")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_public_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Search within a single category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        ProductSearchQuery
    ),
    responses(
        (status = 200, description = "Search result with facets", body = ApiResponse<ProductSearchResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "products"
)]
pub async fn list_category_products(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppQuery(query): AppQuery<ProductSearchQuery>,
) -> Result<Json<ApiResponse<ProductSearchResponseDto>>> {
    let result = service.search_in_category(id, &query).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

/// Search within a single brand
#[utoipa::path(
    get,
    path = "/api/brands/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Brand ID"),
        ProductSearchQuery
    ),
    responses(
        (status = 200, description = "Search result with facets", body = ApiResponse<ProductSearchResponseDto>),
        (status = 404, description = "Brand not found")
    ),
    tag = "products"
)]
pub async fn list_brand_products(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppQuery(query): AppQuery<ProductSearchQuery>,
) -> Result<Json<ApiResponse<ProductSearchResponseDto>>> {
    let result = service.search_in_brand(id, &query).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

// =============================================================================
// ADMIN
// =============================================================================

/// Create a product (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductRequestDto,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductDetailDto>),
        (status = 400, description = "Validation error or unknown category/brand"),
        (status = 409, description = "SKU already exists"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    AppJson(dto): AppJson<ProductRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(product), None, None)),
    ))
}

/// Get a product in any status (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_admin_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_admin_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Replace a product (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductRequestDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductDetailDto>),
        (status = 400, description = "Validation error or unknown category/brand"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "SKU already exists"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ProductRequestDto>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Delete a product with its images and attributes (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Product deleted".to_string()),
        None,
    )))
}
