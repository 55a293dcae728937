pub mod constants;
pub mod serde_helpers;
pub mod test_helpers;
pub mod types;
pub mod validation;
