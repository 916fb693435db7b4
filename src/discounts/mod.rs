//! Discounts
//!
//! Discount rules as they exist after boundary validation: a strict tagged
//! configuration, optional quantity bounds, a product allowlist, and a
//! validity window.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::products::ProductId;

pub mod bundle;
pub mod wire;

/// Discount ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountId(Uuid);

impl DiscountId {
    /// Create a new random discount id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for DiscountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiscountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Errors specific to discount amount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// A percentage or proportional-share calculation could not be safely converted.
    #[error("numeric conversion overflowed or was not finite")]
    Conversion,
}

/// The discount configuration, tagged by type.
#[derive(Debug, Copy, Clone)]
pub enum DiscountKind {
    /// Take a percentage off the applicable amount (e.g. "25% off").
    Percentage(Percentage),

    /// Take a fixed amount off, capped at the applicable amount.
    FixedAmount {
        /// Amount off in minor units.
        amount_minor: u64,
    },

    /// Pay for `pay` units, take `pay + 1` (e.g. "3 for the price of 2").
    BuyXGetY {
        /// Units paid for per bundle.
        pay: u32,
    },
}

impl DiscountKind {
    /// Return the type discriminant used by the precedence hierarchy.
    #[must_use]
    pub const fn discount_type(&self) -> DiscountType {
        match self {
            Self::Percentage(_) => DiscountType::Percentage,
            Self::FixedAmount { .. } => DiscountType::FixedAmount,
            Self::BuyXGetY { .. } => DiscountType::BuyXGetY,
        }
    }

    /// Return the type tag as a string.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::FixedAmount { .. } => "fixed_amount",
            Self::BuyXGetY { .. } => "buy_x_get_y",
        }
    }
}

/// Discount type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    /// Percentage off.
    Percentage,

    /// Fixed amount off.
    FixedAmount,

    /// Bundle offer.
    BuyXGetY,
}

impl DiscountType {
    /// Fixed evaluation order: the first type producing a positive amount
    /// wins and later types are never evaluated.
    pub const PRECEDENCE: [Self; 3] = [Self::Percentage, Self::FixedAmount, Self::BuyXGetY];
}

/// A validated discount rule.
#[derive(Debug, Clone)]
pub struct DiscountRule {
    pub(crate) id: DiscountId,
    pub(crate) kind: DiscountKind,
    pub(crate) min_quantity: Option<u32>,
    pub(crate) max_quantity: Option<u32>,
    pub(crate) products: FxHashSet<ProductId>,
    pub(crate) is_active: bool,
    pub(crate) starts_at: Timestamp,
    pub(crate) ends_at: Option<Timestamp>,
}

impl DiscountRule {
    /// Create an active, unbounded rule applying to every product.
    pub fn new(id: DiscountId, kind: DiscountKind, starts_at: Timestamp) -> Self {
        Self {
            id,
            kind,
            min_quantity: None,
            max_quantity: None,
            products: FxHashSet::default(),
            is_active: true,
            starts_at,
            ends_at: None,
        }
    }

    /// Set inclusive bounds on the applicable quantity.
    #[must_use]
    pub fn with_quantity_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    /// Restrict the rule to an allowlist of products.
    #[must_use]
    pub fn with_products(mut self, products: impl IntoIterator<Item = ProductId>) -> Self {
        self.products = products.into_iter().collect();
        self
    }

    /// Close the validity window at `ends_at`.
    #[must_use]
    pub fn with_end(mut self, ends_at: Timestamp) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    /// Switch the rule on or off.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Return the rule id.
    pub fn id(&self) -> DiscountId {
        self.id
    }

    /// Return the discount configuration.
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// Return the inclusive lower quantity bound, if any.
    pub fn min_quantity(&self) -> Option<u32> {
        self.min_quantity
    }

    /// Return the inclusive upper quantity bound, if any.
    pub fn max_quantity(&self) -> Option<u32> {
        self.max_quantity
    }

    /// Return whether the rule is switched on.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Return whether the rule is active and `at` falls inside its validity
    /// window. Both window ends are inclusive; a missing end is open-ended.
    pub fn is_eligible_at(&self, at: Timestamp) -> bool {
        self.is_active && at >= self.starts_at && self.ends_at.is_none_or(|end| at <= end)
    }

    /// Return whether this rule applies to the given product.
    ///
    /// An empty allowlist applies to every product.
    pub fn applies_to(&self, product: ProductId) -> bool {
        self.products.is_empty() || self.products.contains(&product)
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::Conversion`] if the multiplication overflows or
/// the rounded result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    ((*percent) * Decimal::ONE) // the percentage type does not expose its underlying decimal
        .checked_mul(Decimal::from(minor))
        .ok_or(DiscountError::Conversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::Conversion)
}
