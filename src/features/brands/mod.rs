//! Product brands.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/brands` | Brands ordered by name with product counts |
//! | GET | `/api/brands/{id}` | Single brand |
//! | POST | `/api/admin/brands` | Create brand |
//! | PUT | `/api/admin/brands/{id}` | Replace brand |
//! | DELETE | `/api/admin/brands/{id}` | Delete brand |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::BrandService;
