//! Line resolution
//!
//! Resolves an independent best discount for every cart line. Quantity bounds
//! are checked against the whole cart's total quantity while the monetary
//! amounts stay relative to each line; bundle offers that do not yet qualify
//! fall back to a zero-amount entry carrying the next-bundle hint.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    carts::{Cart, CartItem},
    discounts::{
        DiscountError, DiscountKind, DiscountRule, DiscountType,
        bundle::{BundleHint, bundle_savings},
        percent_of_minor,
    },
    products::ProductId,
    resolution::{AppliedDiscount, ResolveError},
};

/// The resolved discount for a single cart line.
#[derive(Debug, Clone)]
pub struct LineDiscount<'a> {
    /// The product on this line.
    pub product: ProductId,

    /// Quantity purchased on this line.
    pub quantity: u32,

    /// Line total before discounts.
    pub line_total: Money<'a, Currency>,

    /// The best application for this line, if any. A zero-amount entry marks
    /// a bundle offer within reach but not yet triggered.
    pub applied: Option<AppliedDiscount<'a>>,

    /// Nudge towards the next full bundle, when one is close.
    pub hint: Option<BundleHint>,
}

/// The outcome of per-line resolution.
#[derive(Debug, Clone)]
pub struct LineResolution<'a> {
    /// Cart subtotal before discounts.
    pub original_amount: Money<'a, Currency>,

    /// Sum of every line's discount amount.
    pub discount_amount: Money<'a, Currency>,

    /// The subtotal after discounts, floored at zero.
    pub final_amount: Money<'a, Currency>,

    /// One entry per cart line, in cart order.
    pub lines: Vec<LineDiscount<'a>>,
}

/// Resolve the best discount for each cart line independently.
///
/// `rules` must already be filtered for eligibility.
///
/// # Errors
///
/// Returns a [`ResolveError`] if the subtotal or a candidate amount could not
/// be computed.
pub fn resolve_line_discounts<'a>(
    cart: &'a Cart<'a>,
    rules: &[DiscountRule],
) -> Result<LineResolution<'a>, ResolveError> {
    let original = cart.subtotal()?;
    let currency = original.currency();
    let cart_quantity = cart.total_quantity();

    let mut lines = Vec::with_capacity(cart.len());
    let mut discount_total: i64 = 0;

    for item in cart.iter() {
        let line = resolve_line(cart, item, rules, cart_quantity, currency)?;

        if let Some(applied) = &line.applied {
            discount_total += applied.amount.to_minor_units();
        }

        lines.push(line);
    }

    let final_minor = (original.to_minor_units() - discount_total).max(0);

    Ok(LineResolution {
        original_amount: original,
        discount_amount: Money::from_minor(discount_total, currency),
        final_amount: Money::from_minor(final_minor, currency),
        lines,
    })
}

fn resolve_line<'a>(
    cart: &Cart<'a>,
    item: &CartItem<'a>,
    rules: &[DiscountRule],
    cart_quantity: u32,
    currency: &'a Currency,
) -> Result<LineDiscount<'a>, ResolveError> {
    let line_minor = item.line_total_minor();

    let candidates: SmallVec<[&DiscountRule; 8]> = rules
        .iter()
        .filter(|rule| rule.applies_to(item.product().id))
        .collect();

    // The first bundle candidate to produce a hint keeps it, whether or not
    // that candidate ends up winning.
    let mut bundle_hint: Option<(&DiscountRule, BundleHint)> = None;

    for discount_type in DiscountType::PRECEDENCE {
        let mut best: Option<(&DiscountRule, i64)> = None;

        for rule in candidates
            .iter()
            .filter(|rule| rule.kind().discount_type() == discount_type)
        {
            let (amount, hint) = line_amount_minor(cart, item, rule, cart_quantity)?;

            if bundle_hint.is_none() {
                bundle_hint = hint.map(|hint| (*rule, hint));
            }

            if amount > 0 && best.is_none_or(|(_, best_amount)| amount > best_amount) {
                best = Some((*rule, amount));
            }
        }

        if let Some((rule, amount_minor)) = best {
            return Ok(line_discount(
                item,
                currency,
                Some((rule, amount_minor)),
                bundle_hint.map(|(_, hint)| hint),
            ));
        }
    }

    // No type qualified. A bundle within reach still records a zero-amount
    // application so the hint travels with the line.
    if let Some((rule, hint)) = bundle_hint {
        return Ok(line_discount(item, currency, Some((rule, 0)), Some(hint)));
    }

    Ok(line_discount(item, currency, None, None))
}

fn line_discount<'a>(
    item: &CartItem<'a>,
    currency: &'a Currency,
    winner: Option<(&DiscountRule, i64)>,
    hint: Option<BundleHint>,
) -> LineDiscount<'a> {
    LineDiscount {
        product: item.product().id,
        quantity: item.quantity(),
        line_total: Money::from_minor(item.line_total_minor(), currency),
        applied: winner.map(|(rule, amount_minor)| AppliedDiscount {
            discount: rule.id(),
            kind: rule.kind(),
            amount: Money::from_minor(amount_minor, currency),
        }),
        hint,
    }
}

/// Compute the line-level amount a rule would take off this line, plus any
/// bundle hint it generates.
///
/// Quantity bounds gate against the whole cart's quantity, not the line's;
/// bundle offers instead read the bounds as pay-threshold and bundle size,
/// against the line's own quantity and price.
fn line_amount_minor(
    cart: &Cart<'_>,
    item: &CartItem<'_>,
    rule: &DiscountRule,
    cart_quantity: u32,
) -> Result<(i64, Option<BundleHint>), ResolveError> {
    let line_minor = item.line_total_minor();

    match rule.kind() {
        DiscountKind::Percentage(percent) => {
            if quantity_gate_blocks(rule, cart_quantity) {
                return Ok((0, None));
            }

            Ok((percent_of_minor(&percent, line_minor)?, None))
        }
        DiscountKind::FixedAmount { amount_minor } => {
            if quantity_gate_blocks(rule, cart_quantity) {
                return Ok((0, None));
            }

            Ok((fixed_line_share(cart, rule, line_minor, amount_minor)?, None))
        }
        DiscountKind::BuyXGetY { pay } => {
            let pay_threshold = rule.min_quantity().unwrap_or(pay);
            let bundle = rule
                .max_quantity()
                .unwrap_or_else(|| pay_threshold.saturating_add(1));

            let savings = bundle_savings(
                pay_threshold,
                bundle,
                item.product().price.to_minor_units(),
                item.quantity(),
            );

            Ok((savings.savings.max(0), savings.hint))
        }
    }
}

/// Quantity bounds gate against the whole cart's quantity in the line path.
fn quantity_gate_blocks(rule: &DiscountRule, cart_quantity: u32) -> bool {
    rule.min_quantity().is_some_and(|min| cart_quantity < min)
}

/// Distribute a fixed amount across the rule's matching lines by line share.
///
/// The matching group as a whole never receives more than it is worth.
fn fixed_line_share(
    cart: &Cart<'_>,
    rule: &DiscountRule,
    line_minor: i64,
    amount_minor: u64,
) -> Result<i64, ResolveError> {
    let applicable_minor: i64 = cart
        .iter()
        .filter(|item| rule.applies_to(item.product().id))
        .map(CartItem::line_total_minor)
        .sum();

    if applicable_minor <= 0 || line_minor <= 0 {
        return Ok(0);
    }

    let group_amount = i64::try_from(amount_minor)
        .unwrap_or(i64::MAX)
        .min(applicable_minor);

    let share = Decimal::from(group_amount) * Decimal::from(line_minor)
        / Decimal::from(applicable_minor);

    share
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(ResolveError::Discount(DiscountError::Conversion))
}
