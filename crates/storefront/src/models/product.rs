//! Catalog product types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use online_shop_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current catalog price. Order items keep their own copy.
    pub price: Price,
}

/// Validated fields for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
}

impl ProductInput {
    /// Maximum number of decimal places a price may carry (`NUMERIC(12, 2)`).
    pub const PRICE_SCALE: u32 = 2;

    /// Smallest price the column can't hold: 10 integer digits.
    pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Check the invariants the schema enforces.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message if the name is blank, or the price has
    /// more than two decimal places or ten integer digits.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("product name cannot be empty".to_owned());
        }
        if self.name.chars().count() > 255 {
            return Err("product name must be at most 255 characters".to_owned());
        }
        if self.price.amount().scale() > Self::PRICE_SCALE {
            return Err(format!(
                "price must have at most {} decimal places",
                Self::PRICE_SCALE
            ));
        }
        if self.price.amount() >= Self::PRICE_LIMIT {
            return Err(format!("price must be below {}", Self::PRICE_LIMIT));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, cents: i64, scale: u32) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            price: Price::new(Decimal::new(cents, scale)).unwrap(),
        }
    }

    #[test]
    fn test_validate_accepts_two_decimals() {
        assert!(input("Mug", 1299, 2).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(input("   ", 100, 2).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sub_cent_price() {
        assert!(input("Mug", 12999, 3).validate().is_err());
    }

    #[test]
    fn test_price_limit_is_ten_integer_digits() {
        assert_eq!(ProductInput::PRICE_LIMIT, Decimal::new(10_000_000_000, 0));
    }

    #[test]
    fn test_validate_rejects_price_beyond_column() {
        assert!(input("Mug", 999_999_999_999, 2).validate().is_ok());
        assert!(input("Mug", 10_000_000_000, 0).validate().is_err());
        assert!(input("Yacht", 99_999_999_999, 0).validate().is_err());
    }
}
