use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryRequestDto, CategoryResponseDto, CategoryTreeDto,
    ListCategoriesQuery,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// Either the root-level tree or the flat ordered list
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListing {
    Tree(Vec<CategoryTreeDto>),
    Flat(Vec<CategoryResponseDto>),
}

/// List categories
///
/// Returns the root-level tree by default, or a flat list with `flat=true`.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Category tree or flat list", body = ApiResponse<CategoryListing>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<CategoryListing>>> {
    let listing = if query.flat {
        CategoryListing::Flat(service.list(query.include_inactive).await?)
    } else {
        CategoryListing::Tree(service.list_tree(query.include_inactive).await?)
    };
    Ok(Json(ApiResponse::success(Some(listing), None, None)))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    let category = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Create a category (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryRequestDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryDetailDto>),
        (status = 400, description = "Validation error or invalid parent"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category), None, None)),
    ))
}

/// Replace a category (admin only)
///
/// Changing the parent is rejected with 409 when it would create a cycle.
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryRequestDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryDetailDto>),
        (status = 400, description = "Validation error or invalid parent"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Circular reference"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CategoryRequestDto>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Delete a category (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has children or products"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
        None,
    )))
}
