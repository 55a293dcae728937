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
use crate::features::brands::dtos::{BrandRequestDto, BrandResponseDto, ListBrandsQuery};
use crate::features::brands::services::BrandService;
use crate::shared::types::ApiResponse;

/// List brands ordered by name
#[utoipa::path(
    get,
    path = "/api/brands",
    params(ListBrandsQuery),
    responses(
        (status = 200, description = "List of brands", body = ApiResponse<Vec<BrandResponseDto>>),
    ),
    tag = "brands"
)]
pub async fn list_brands(
    State(service): State<Arc<BrandService>>,
    AppQuery(query): AppQuery<ListBrandsQuery>,
) -> Result<Json<ApiResponse<Vec<BrandResponseDto>>>> {
    let brands = service.list(query.include_inactive).await?;
    Ok(Json(ApiResponse::list(brands)))
}

/// Get brand by ID
#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand found", body = ApiResponse<BrandResponseDto>),
        (status = 404, description = "Brand not found")
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    let brand = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(brand), None, None)))
}

/// Create a brand (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/brands",
    request_body = BrandRequestDto,
    responses(
        (status = 201, description = "Brand created", body = ApiResponse<BrandResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Active brand with this name already exists"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    AppJson(dto): AppJson<BrandRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<BrandResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let brand = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(brand), None, None)),
    ))
}

/// Replace a brand (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = BrandRequestDto,
    responses(
        (status = 200, description = "Brand updated", body = ApiResponse<BrandResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Active brand with this name already exists"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<BrandRequestDto>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let brand = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(brand), None, None)))
}

/// Delete a brand (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand deleted"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Brand still has products"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Brand deleted".to_string()),
        None,
    )))
}
