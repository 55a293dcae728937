use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::brands::{handlers, services::BrandService};

/// Create public routes for the brands feature
pub fn routes(service: Arc<BrandService>) -> Router {
    Router::new()
        .route("/api/brands", get(handlers::list_brands))
        .route("/api/brands/{id}", get(handlers::get_brand))
        .with_state(service)
}

/// Create admin routes for brand management
pub fn admin_routes(service: Arc<BrandService>) -> Router {
    Router::new()
        .route("/api/admin/brands", post(handlers::create_brand))
        .route(
            "/api/admin/brands/{id}",
            put(handlers::update_brand).delete(handlers::delete_brand),
        )
        .with_state(service)
}
