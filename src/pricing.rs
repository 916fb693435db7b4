//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::carts::CartItem;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total price of a list of cart items, quantities included.
///
/// # Errors
///
/// - [`TotalPriceError::NoItems`]: No items were provided, so currency could not be determined.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(items: &[CartItem<'a>]) -> Result<Money<'a, Currency>, TotalPriceError> {
    let first = items.first().ok_or(TotalPriceError::NoItems)?;

    let total = items.iter().try_fold(
        Money::from_minor(0, first.product().price.currency()),
        |acc, item| acc.add(item.line_total()),
    )?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::products::{Product, ProductId};

    use super::*;

    fn item(price_minor: i64, quantity: u32) -> CartItem<'static> {
        CartItem::new(
            Product {
                id: ProductId::new(),
                name: "bangle".to_string(),
                price: Money::from_minor(price_minor, iso::USD),
            },
            quantity,
        )
    }

    #[test]
    fn test_total_price() -> TestResult {
        let items = [item(100, 2), item(200, 1)];

        assert_eq!(total_price(&items)?, Money::from_minor(400, iso::USD));

        Ok(())
    }

    #[test]
    fn test_total_price_empty() {
        let items: [CartItem<'static>; 0] = [];

        assert!(matches!(total_price(&items), Err(TotalPriceError::NoItems)));
    }
}
