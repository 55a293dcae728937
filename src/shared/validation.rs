use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating stock-keeping units
    /// Must be uppercase alphanumeric segments separated by single hyphens
    /// - Valid: "TSHIRT-RED-M", "SKU123", "A-1"
    /// - Invalid: "-SKU", "SKU-", "SKU--1", "sku-1", "SKU_1", "SKU 1"
    pub static ref SKU_REGEX: Regex = Regex::new(r"^[A-Z0-9]+(?:-[A-Z0-9]+)*$").unwrap();
}

/// Largest amount a `NUMERIC(18, 2)` price column holds
/// (999_999_999_999_999_999 at scale 2; `Decimal::new` is not const)
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

/// Prices and compare-at prices: not negative, within the stored precision
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("negative_price");
        err.message = Some("price must not be negative".into());
        return Err(err);
    }
    if *value > MAX_PRICE {
        let mut err = ValidationError::new("price_too_large");
        err.message = Some(format!("price must not exceed {}", MAX_PRICE).into());
        return Err(err);
    }
    Ok(())
}

/// Ratings are on a 0-5 scale
pub fn validate_rating(value: impl std::borrow::Borrow<f64>) -> Result<(), ValidationError> {
    if !(0.0..=5.0).contains(value.borrow()) {
        let mut err = ValidationError::new("rating_range");
        err.message = Some("rating must be between 0 and 5".into());
        return Err(err);
    }
    Ok(())
}
