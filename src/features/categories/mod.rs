//! Product categories.
//!
//! Categories form a tree through `parent_id`. Public endpoints serve the
//! tree (or a flat list) and single categories; admin endpoints create,
//! replace and delete them. Reparenting is checked against the whole
//! hierarchy so a category never becomes its own ancestor.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | Category tree or flat list |
//! | GET | `/api/categories/{id}` | Category with parent name and children |
//! | POST | `/api/admin/categories` | Create category |
//! | PUT | `/api/admin/categories/{id}` | Replace category |
//! | DELETE | `/api/admin/categories/{id}` | Delete category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod tree;

pub use services::CategoryService;
