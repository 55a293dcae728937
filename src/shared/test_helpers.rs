#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, Role};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "test-admin-id".to_string(),
        role: Role::Admin,
    }
}

#[cfg(test)]
pub fn create_customer_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "test-customer-id".to_string(),
        role: Role::Customer,
    }
}

#[cfg(test)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
async fn inject_customer_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_customer_user());
    next.run(request).await
}

/// Wrap a router so every request carries an authenticated admin
#[cfg(test)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

/// Wrap a router so every request carries an authenticated customer
#[cfg(test)]
pub fn with_customer_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_customer_middleware))
}
