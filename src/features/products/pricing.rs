//! Derived, read-only product fields. Pure functions over primitive
//! values so they stay independent of the storage row types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// On sale only when a strictly higher original price exists
pub fn is_on_sale(price: Decimal, original_price: Option<Decimal>) -> bool {
    matches!(original_price, Some(original) if original > price)
}

/// Percentage off the original price, rounded half-up to two decimals.
/// Absent when the product is not on sale.
pub fn discount_percentage(price: Decimal, original_price: Option<Decimal>) -> Option<Decimal> {
    let original = original_price.filter(|original| *original > price)?;
    // original > price >= 0 here, so original is non-zero
    let raw = (original - price) / original * Decimal::ONE_HUNDRED;
    let mut pct = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(2);
    Some(pct)
}

pub fn is_in_stock(stock_quantity: i32) -> bool {
    stock_quantity > 0
}

pub fn is_low_stock(stock_quantity: i32, low_stock_threshold: i32) -> bool {
    stock_quantity > 0 && stock_quantity <= low_stock_threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn classify(stock_quantity: i32, low_stock_threshold: i32) -> Self {
        if !is_in_stock(stock_quantity) {
            StockStatus::OutOfStock
        } else if is_low_stock(stock_quantity, low_stock_threshold) {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

/// All derived fields computed at once for a product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub is_on_sale: bool,
    pub discount_percentage: Option<Decimal>,
    pub is_in_stock: bool,
    pub is_low_stock: bool,
    pub stock_status: StockStatus,
}

impl DerivedFields {
    pub fn compute(
        price: Decimal,
        original_price: Option<Decimal>,
        stock_quantity: i32,
        low_stock_threshold: i32,
    ) -> Self {
        Self {
            is_on_sale: is_on_sale(price, original_price),
            discount_percentage: discount_percentage(price, original_price),
            is_in_stock: is_in_stock(stock_quantity),
            is_low_stock: is_low_stock(stock_quantity, low_stock_threshold),
            stock_status: StockStatus::classify(stock_quantity, low_stock_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_on_sale_requires_higher_original() {
        assert!(is_on_sale(dec("80"), Some(dec("100"))));
        assert!(!is_on_sale(dec("100"), Some(dec("100"))));
        assert!(!is_on_sale(dec("120"), Some(dec("100"))));
        assert!(!is_on_sale(dec("100"), None));
    }

    #[test]
    fn test_discount_percentage_basic() {
        assert_eq!(
            discount_percentage(dec("80"), Some(dec("100"))),
            Some(dec("20.00"))
        );
        assert_eq!(discount_percentage(dec("100"), Some(dec("100"))), None);
        assert_eq!(discount_percentage(dec("100"), None), None);
    }

    #[test]
    fn test_discount_percentage_rounds_half_up() {
        // (200 - 199.99) / 200 * 100 = 0.005 exactly
        assert_eq!(
            discount_percentage(dec("199.99"), Some(dec("200"))),
            Some(dec("0.01"))
        );
        // 1/3 off
        assert_eq!(
            discount_percentage(dec("20"), Some(dec("30"))),
            Some(dec("33.33"))
        );
        // 2/3 off
        assert_eq!(
            discount_percentage(dec("10"), Some(dec("30"))),
            Some(dec("66.67"))
        );
    }

    #[test]
    fn test_discount_always_has_two_decimals() {
        let pct = discount_percentage(dec("80"), Some(dec("100"))).unwrap();
        assert_eq!(pct.to_string(), "20.00");
    }

    #[test]
    fn test_free_product_is_full_discount() {
        assert_eq!(
            discount_percentage(Decimal::ZERO, Some(dec("49.99"))),
            Some(dec("100.00"))
        );
    }

    #[test]
    fn test_stock_flags() {
        assert!(!is_in_stock(0));
        assert!(is_in_stock(1));

        assert!(!is_low_stock(0, 10));
        assert!(is_low_stock(1, 10));
        assert!(is_low_stock(10, 10));
        assert!(!is_low_stock(11, 10));
        assert!(!is_low_stock(5, 0));
    }

    #[test]
    fn test_stock_status_classification() {
        assert_eq!(StockStatus::classify(0, 10), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(3, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(StockStatus::OutOfStock).unwrap(),
            serde_json::json!("out_of_stock")
        );
        assert_eq!(
            serde_json::to_value(StockStatus::LowStock).unwrap(),
            serde_json::json!("low_stock")
        );
    }

    #[test]
    fn test_derived_fields_compute() {
        let derived = DerivedFields::compute(dec("75"), Some(dec("100")), 4, 10);
        assert!(derived.is_on_sale);
        assert_eq!(derived.discount_percentage, Some(dec("25.00")));
        assert!(derived.is_in_stock);
        assert!(derived.is_low_stock);
        assert_eq!(derived.stock_status, StockStatus::LowStock);
    }
}
