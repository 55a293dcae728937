//! Products: search, featured shelf, detail and admin maintenance.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/products` | Search with filters, sorting, pagination and facets |
//! | GET | `/api/products/featured` | Featured products |
//! | GET | `/api/products/{id}` | Active product with images and attributes |
//! | GET | `/api/categories/{id}/products` | Search within a category |
//! | GET | `/api/brands/{id}/products` | Search within a brand |
//! | POST | `/api/admin/products` | Create product |
//! | GET | `/api/admin/products/{id}` | Product in any status |
//! | PUT | `/api/admin/products/{id}` | Replace product |
//! | DELETE | `/api/admin/products/{id}` | Delete product |

pub mod dtos;
pub mod handlers;
pub mod mapper;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod search;
pub mod services;

pub use services::ProductService;
