use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{AppConfig, SwaggerConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::JwtValidator;
use crate::features::brands::{routes as brands_routes, BrandService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::products::{routes as products_routes, ProductService};

/// Feature services shared by the HTTP routers
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub brands: Arc<BrandService>,
    pub products: Arc<ProductService>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

fn swagger_router(swagger: &SwaggerConfig) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: swagger.title.clone(),
        version: swagger.version.clone(),
        description: swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let router =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    if let Some(credentials) = swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        router.layer(from_fn_with_state(
            middleware::DocsCredentials::new(credentials),
            middleware::docs_basic_auth,
        ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        router
    }
}

/// Assemble the application: open read routes, admin routes behind bearer
/// auth, health check and API docs, wrapped in the shared tower layers.
pub fn build_router(
    app: &AppConfig,
    swagger: &SwaggerConfig,
    services: AppServices,
    jwt_validator: Arc<JwtValidator>,
) -> Router {
    // Admin routes (require JWT authentication, admin role checked per handler)
    let admin_routes = Router::new()
        .merge(categories_routes::admin_routes(Arc::clone(
            &services.categories,
        )))
        .merge(brands_routes::admin_routes(Arc::clone(&services.brands)))
        .merge(products_routes::admin_routes(Arc::clone(&services.products)))
        .route_layer(from_fn_with_state(
            jwt_validator,
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(categories_routes::routes(services.categories))
        .merge(brands_routes::routes(services.brands))
        .merge(products_routes::routes(services.products));

    let health_route = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(swagger_router(swagger))
        .merge(admin_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(app.cors_allowed_origins.clone()))
                .layer(DefaultBodyLimit::max(app.max_request_body_size)),
        )
}
