//! Resolution
//!
//! Selects which discount applies to a cart under the fixed type precedence:
//! percentage first, then fixed amounts, then bundle offers. The first type
//! producing a positive amount wins and later types are never evaluated;
//! within a type the largest amount wins, keeping the earliest candidate on
//! ties.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    carts::Cart,
    discounts::{
        DiscountError, DiscountId, DiscountKind, DiscountRule, DiscountType, percent_of_minor,
    },
    pricing::TotalPriceError,
};

pub mod lines;

/// Errors raised while resolving discounts against a cart.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Percentage or proportional-share conversion failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from total price calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// A single discount application in a resolution result.
#[derive(Debug, Clone)]
pub struct AppliedDiscount<'a> {
    /// Id of the applied rule.
    pub discount: DiscountId,

    /// The applied rule's configuration.
    pub kind: DiscountKind,

    /// The monetary amount taken off.
    pub amount: Money<'a, Currency>,
}

/// The outcome of cart-level resolution: at most one winning discount.
#[derive(Debug, Clone)]
pub struct CartResolution<'a> {
    /// Cart subtotal before discounts.
    pub original_amount: Money<'a, Currency>,

    /// Amount taken off the subtotal.
    pub discount_amount: Money<'a, Currency>,

    /// The subtotal after the discount, floored at zero.
    pub final_amount: Money<'a, Currency>,

    /// The winning application. Never more than one entry.
    pub applied: SmallVec<[AppliedDiscount<'a>; 1]>,

    /// The winning rule, if any.
    pub selected: Option<DiscountRule>,
}

/// Resolve at most one discount to apply to the cart as a whole.
///
/// `rules` must already be filtered for eligibility; quantity bounds are
/// checked here against the total quantity of the lines each rule matches.
///
/// # Errors
///
/// Returns a [`ResolveError`] if the subtotal or a candidate amount could not
/// be computed.
pub fn resolve_cart_discount<'a>(
    cart: &'a Cart<'a>,
    rules: &[DiscountRule],
) -> Result<CartResolution<'a>, ResolveError> {
    let original = cart.subtotal()?;

    for discount_type in DiscountType::PRECEDENCE {
        let mut best: Option<(&DiscountRule, i64)> = None;

        for rule in rules
            .iter()
            .filter(|rule| rule.kind().discount_type() == discount_type)
        {
            let amount = cart_amount_minor(cart, rule)?;

            if amount > 0 && best.is_none_or(|(_, best_amount)| amount > best_amount) {
                best = Some((rule, amount));
            }
        }

        if best.is_some() {
            return Ok(build_resolution(original, best));
        }
    }

    Ok(build_resolution(original, None))
}

/// Compute the cart-level amount in minor units a rule would take off.
///
/// The rule's allowlist selects the matching lines. The minimum-quantity gate
/// is checked against the matching lines' total quantity; the quantity used in
/// the computation is clamped to the rule's maximum. Bundle offers price the
/// freed units at the cheapest matching line's unit price.
fn cart_amount_minor(cart: &Cart<'_>, rule: &DiscountRule) -> Result<i64, ResolveError> {
    let mut applicable_minor: i64 = 0;
    let mut total_quantity: u32 = 0;
    let mut cheapest_unit_minor: Option<i64> = None;

    for item in cart.iter().filter(|item| rule.applies_to(item.product().id)) {
        applicable_minor += item.line_total_minor();
        total_quantity += item.quantity();

        let unit_minor = item.product().price.to_minor_units();

        if cheapest_unit_minor.is_none_or(|cheapest| unit_minor < cheapest) {
            cheapest_unit_minor = Some(unit_minor);
        }
    }

    if applicable_minor <= 0 || total_quantity == 0 {
        return Ok(0);
    }

    if rule.min_quantity().is_some_and(|min| total_quantity < min) {
        return Ok(0);
    }

    let quantity = rule
        .max_quantity()
        .map_or(total_quantity, |max| total_quantity.min(max));

    let amount = match rule.kind() {
        DiscountKind::Percentage(percent) => percent_of_minor(&percent, applicable_minor)?,
        DiscountKind::FixedAmount { amount_minor } => i64::try_from(amount_minor)
            .unwrap_or(i64::MAX)
            .min(applicable_minor),
        DiscountKind::BuyXGetY { pay } => {
            let bundle = pay.saturating_add(1);
            let offers = i64::from(quantity / bundle);

            offers * cheapest_unit_minor.unwrap_or(0)
        }
    };

    Ok(amount)
}

fn build_resolution<'a>(
    original: Money<'a, Currency>,
    winner: Option<(&DiscountRule, i64)>,
) -> CartResolution<'a> {
    let currency = original.currency();

    let Some((rule, amount_minor)) = winner else {
        return CartResolution {
            original_amount: original,
            discount_amount: Money::from_minor(0, currency),
            final_amount: original,
            applied: SmallVec::new(),
            selected: None,
        };
    };

    let discount = Money::from_minor(amount_minor, currency);
    let final_minor = (original.to_minor_units() - amount_minor).max(0);

    let mut applied = SmallVec::new();

    applied.push(AppliedDiscount {
        discount: rule.id(),
        kind: rule.kind(),
        amount: discount,
    });

    CartResolution {
        original_amount: original,
        discount_amount: discount,
        final_amount: Money::from_minor(final_minor, currency),
        applied,
        selected: Some(rule.clone()),
    }
}
