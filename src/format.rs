//! Formatting
//!
//! Display-ready strings for resolved amounts. No business logic lives here.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::discounts::bundle::BundleHint;

/// Render a monetary amount as a display string, symbol and separators included.
#[must_use]
pub fn currency(amount: &Money<'_, Currency>) -> String {
    amount.to_string()
}

/// Render a percentage with at most two decimal places, e.g. `33.33%`.
#[must_use]
pub fn percentage(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

/// Render the customer-facing message for a bundle hint.
#[must_use]
pub fn bundle_hint(hint: &BundleHint) -> String {
    format!(
        "Add {} more to take {} for the price of {} and save up to {}",
        hint.add_quantity,
        hint.bundle_quantity,
        hint.payable_quantity,
        percentage(hint.max_savings_percentage),
    )
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;

    use crate::discounts::bundle::bundle_savings;

    use super::*;

    #[test]
    fn currency_renders_symbol_and_separators() {
        assert_eq!(currency(&Money::from_minor(600, iso::USD)), "$6.00");
        assert_eq!(currency(&Money::from_minor(123_456, iso::USD)), "$1,234.56");
    }

    #[test]
    fn percentage_trims_trailing_zeros() {
        assert_eq!(percentage(Decimal::new(3333, 2)), "33.33%");
        assert_eq!(percentage(Decimal::new(2500, 2)), "25%");
    }

    #[test]
    fn bundle_hint_message_reads_naturally() {
        let savings = bundle_savings(2, 3, 10, 4);
        let hint = savings.hint.expect("hint");

        assert_eq!(
            bundle_hint(&hint),
            "Add 1 more to take 6 for the price of 4 and save up to 33.33%"
        );
    }
}
