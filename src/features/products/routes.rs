use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// Create public routes for the products feature
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::search_products))
        .route("/api/products/featured", get(handlers::featured_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .route(
            "/api/categories/{id}/products",
            get(handlers::list_category_products),
        )
        .route(
            "/api/brands/{id}/products",
            get(handlers::list_brand_products),
        )
        .with_state(service)
}

/// Create admin routes for product management
pub fn admin_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/admin/products", post(handlers::create_product))
        .route(
            "/api/admin/products/{id}",
            get(handlers::get_admin_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::CategoryInput;
    use crate::modules::catalog::{CatalogStore, MemoryCatalogStore};
    use crate::shared::test_helpers::{with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use uuid::Uuid;

    async fn setup() -> (TestServer, Uuid) {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
        let category = store
            .insert_category(&CategoryInput {
                parent_id: None,
                name: "Kitchen".to_string(),
                description: None,
                image_url: None,
                display_order: 0,
                is_active: true,
            })
            .await
            .unwrap();

        let service = Arc::new(ProductService::new(store, 10));
        let app = routes(service.clone()).merge(with_admin_auth(admin_routes(service)));
        (TestServer::new(app).unwrap(), category.id)
    }

    fn product(category_id: Uuid, sku: &str, price: &str) -> Value {
        json!({
            "categoryId": category_id,
            "name": format!("Kettle {}", sku),
            "sku": sku,
            "price": price,
            "stockQuantity": 3,
            "status": "active"
        })
    }

    #[tokio::test]
    async fn test_create_then_search() {
        let (server, category_id) = setup().await;

        let mut on_sale = product(category_id, "KETTLE-1", "80.00");
        on_sale["originalPrice"] = json!("100.00");
        server
            .post("/api/admin/products")
            .json(&on_sale)
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-2", "40.00"))
            .await
            .assert_status(StatusCode::CREATED);

        let body = server
            .get("/api/products")
            .add_query_param("sortBy", "price")
            .add_query_param("sortDirection", "desc")
            .add_query_param("pageSize", "1")
            .await
            .json::<Value>();

        let data = &body["data"];
        assert_eq!(data["totalCount"], 2);
        assert_eq!(data["totalPages"], 2);
        assert_eq!(data["hasNextPage"], true);
        assert_eq!(data["products"][0]["sku"], "KETTLE-1");
        assert_eq!(data["products"][0]["isOnSale"], true);
        assert_eq!(data["products"][0]["discountPercentage"], "20.00");
        assert_eq!(data["products"][0]["stockStatus"], "low_stock");
        assert_eq!(data["availableCategories"][0]["name"], "Kitchen");
    }

    #[tokio::test]
    async fn test_snake_case_query_and_unknown_sort() {
        let (server, category_id) = setup().await;
        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-1", "10.00"))
            .await
            .assert_status(StatusCode::CREATED);

        let body = server
            .get("/api/products")
            .add_query_param("sort_by", "bogus")
            .add_query_param("min_price", "5")
            .await
            .json::<Value>();
        assert_eq!(body["data"]["totalCount"], 1);
    }

    #[tokio::test]
    async fn test_blank_form_fields_are_ignored() {
        let (server, category_id) = setup().await;
        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-1", "10.00"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/products")
            .add_query_param("query", "")
            .add_query_param("categoryId", "")
            .add_query_param("minPrice", "")
            .add_query_param("onSale", "")
            .add_query_param("page", "")
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"]["totalCount"], 1);
        assert_eq!(body["data"]["currentPage"], 1);

        server
            .get("/api/products/featured")
            .add_query_param("count", "")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_malformed_query_value_uses_error_envelope() {
        let (server, _) = setup().await;
        let response = server
            .get("/api/products")
            .add_query_param("minPrice", "cheap")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_out_of_range_price_is_bad_request() {
        let (server, category_id) = setup().await;
        let response = server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-9", "12345678901234567.00"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_duplicate_sku_and_invalid_body() {
        let (server, category_id) = setup().await;
        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-1", "10.00"))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-1", "12.00"))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .post("/api/admin/products")
            .json(&product(category_id, "KETTLE-3", "-1.00"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/admin/products")
            .json(&product(Uuid::now_v7(), "KETTLE-4", "1.00"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_draft_visible_only_to_admin() {
        let (server, category_id) = setup().await;
        let mut draft = product(category_id, "KETTLE-9", "10.00");
        draft["status"] = json!("draft");
        let id = server
            .post("/api/admin/products")
            .json(&draft)
            .await
            .json::<Value>()["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .get(&format!("/api/products/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/api/admin/products/{}", id))
            .await
            .assert_status_ok();

        server
            .delete(&format!("/api/admin/products/{}", id))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/admin/products/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_scoped_listing_unknown_brand() {
        let (server, _) = setup().await;
        server
            .get(&format!("/api/brands/{}/products", Uuid::now_v7()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_featured_route_not_shadowed_by_id() {
        let (server, _) = setup().await;
        let body = server
            .get("/api/products/featured")
            .await
            .json::<Value>();
        assert_eq!(body["success"], true);
        assert_eq!(body["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn test_customer_cannot_create() {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
        let service = Arc::new(ProductService::new(store, 10));
        let server = TestServer::new(with_customer_auth(admin_routes(service))).unwrap();

        server
            .post("/api/admin/products")
            .json(&product(Uuid::now_v7(), "KETTLE-1", "10.00"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
