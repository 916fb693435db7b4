//! Bundle offers
//!
//! "Pay N, take M" arithmetic: how many complete bundles a purchased quantity
//! earns, what the customer actually pays, and the nudge towards the next
//! full bundle when one is within reach.

use rust_decimal::{Decimal, RoundingStrategy};

/// Savings produced by a bundle offer against a single unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleSavings {
    /// Complete bundles in the purchased quantity.
    pub offer_applications: u32,

    /// Units left over after the complete bundles.
    pub remainder: u32,

    /// Units the customer actually pays for.
    pub payable_units: u32,

    /// Undiscounted total in minor units.
    pub total_without_discount: i64,

    /// Discounted total in minor units.
    pub total_with_discount: i64,

    /// Minor units saved.
    pub savings: i64,

    /// Savings as a percentage of the undiscounted total, rounded to 2 dp.
    pub savings_percentage: Decimal,

    /// Suggestion for reaching the next full bundle, when one is close.
    pub hint: Option<BundleHint>,
}

/// A nudge towards the next full bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BundleHint {
    /// Paid units to add to trigger the next offer application.
    pub add_quantity: u32,

    /// Quantity the customer would purchase after adding.
    pub suggested_quantity: u32,

    /// Total units taken home once the next bundle completes.
    pub bundle_quantity: u32,

    /// Units paid for at that point.
    pub payable_quantity: u32,

    /// Best-case savings percentage at full-bundle efficiency, rounded to 2 dp.
    pub max_savings_percentage: Decimal,
}

/// Calculate the savings a "pay `pay`, take `bundle`" offer produces for
/// `quantity` units at `unit_price_minor` each.
///
/// A hint is emitted when the leftover units are short of the next pay
/// threshold (`0 < remainder < pay`), regardless of whether any bundle has
/// completed yet. Degenerate parameters (an empty bundle, a pay threshold
/// covering the whole bundle, a non-positive price, or nothing purchased)
/// produce zero savings and no hint.
#[must_use]
pub fn bundle_savings(
    pay: u32,
    bundle: u32,
    unit_price_minor: i64,
    quantity: u32,
) -> BundleSavings {
    if pay == 0 || bundle <= pay || unit_price_minor <= 0 || quantity == 0 {
        let total = i64::from(quantity) * unit_price_minor.max(0);

        return BundleSavings {
            offer_applications: 0,
            remainder: 0,
            payable_units: quantity,
            total_without_discount: total,
            total_with_discount: total,
            savings: 0,
            savings_percentage: Decimal::ZERO,
            hint: None,
        };
    }

    let offer_applications = quantity / bundle;
    let remainder = quantity % bundle;
    let payable_units = offer_applications * pay + remainder;

    let total_without_discount = i64::from(quantity) * unit_price_minor;
    let total_with_discount = i64::from(payable_units) * unit_price_minor;
    let savings = total_without_discount - total_with_discount;

    let hint = (remainder > 0 && remainder < pay).then(|| {
        let add_quantity = pay - remainder;

        BundleHint {
            add_quantity,
            suggested_quantity: quantity + add_quantity,
            bundle_quantity: (offer_applications + 1) * bundle,
            payable_quantity: (offer_applications + 1) * pay,
            max_savings_percentage: percentage_of(i64::from(bundle - pay), i64::from(bundle)),
        }
    });

    BundleSavings {
        offer_applications,
        remainder,
        payable_units,
        total_without_discount,
        total_with_discount,
        savings,
        savings_percentage: percentage_of(savings, total_without_discount),
        hint,
    }
}

/// `part / whole × 100`, rounded to two decimal places; zero when `whole` is zero.
fn percentage_of(part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }

    (Decimal::from(part) / Decimal::from(whole) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
