//! Catalog persistence: the repository trait and its Postgres and
//! in-memory implementations.

mod memory;
mod postgres;
pub mod seed;
mod store;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;
pub use seed::seed_demo_catalog;
pub use store::CatalogStore;
