/// Default page size for paginated product listings
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of products returned by the featured listing
pub const DEFAULT_FEATURED_COUNT: i64 = 8;

/// Maximum number of products returned by the featured listing
pub const MAX_FEATURED_COUNT: i64 = 50;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Administrator role claim - can create, update and delete catalog entries
pub const ROLE_ADMIN: &str = "admin";

/// Customer role claim - read-only access to the catalog
pub const ROLE_CUSTOMER: &str = "customer";
