//! Wire records
//!
//! Discount records arrive from the lookup boundary as loosely-typed JSON.
//! They are parsed into strict [`DiscountRule`]s here; a record that fails
//! validation is excluded by the caller, never surfaced to the customer.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    discounts::{DiscountId, DiscountKind, DiscountRule},
    products::ProductId,
};

/// Errors raised while validating a raw discount record.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountParseError {
    /// A percentage value was outside the [0, 100] range.
    #[error("percentage {0} is outside the range 0-100")]
    PercentageOutOfRange(Decimal),

    /// A fixed amount was negative or not a whole number of minor units.
    #[error("fixed amount {0} is not a non-negative whole number of minor units")]
    InvalidFixedAmount(Decimal),

    /// A bundle pay threshold below one unit, or not a whole number.
    #[error("pay threshold {0} must be a whole number of at least 1")]
    InvalidPayThreshold(Decimal),

    /// The upper quantity bound was lower than the lower bound.
    #[error("maxQuantity {max} is lower than minQuantity {min}")]
    InvertedQuantityBounds {
        /// Lower bound from the record.
        min: u32,
        /// Upper bound from the record.
        max: u32,
    },
}

/// The discount type tag as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawDiscountType {
    /// Percent off the applicable amount.
    Percentage,

    /// Flat amount off.
    Fixed,

    /// Bundle offer ("pay N, take N+1").
    BuyXGetY,
}

/// A discount record as fetched, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiscount {
    /// Unique identifier.
    pub id: DiscountId,

    /// Discount type tag.
    #[serde(rename = "type")]
    pub discount_type: RawDiscountType,

    /// Type-dependent value: percent off, minor-unit amount, or pay threshold.
    pub value: Decimal,

    /// Inclusive lower bound on applicable quantity.
    #[serde(default)]
    pub min_quantity: Option<u32>,

    /// Inclusive upper bound on applicable quantity.
    #[serde(default)]
    pub max_quantity: Option<u32>,

    /// Product allowlist; absent or empty applies to every product.
    #[serde(default)]
    pub items: Option<Vec<ProductId>>,

    /// Whether the discount is switched on.
    pub is_active: bool,

    /// Start of the validity window.
    pub start_date: Timestamp,

    /// Optional end of the validity window; absent means open-ended.
    #[serde(default)]
    pub end_date: Option<Timestamp>,
}

impl TryFrom<RawDiscount> for DiscountRule {
    type Error = DiscountParseError;

    fn try_from(raw: RawDiscount) -> Result<Self, Self::Error> {
        let kind = match raw.discount_type {
            RawDiscountType::Percentage => {
                if raw.value < Decimal::ZERO || raw.value > Decimal::ONE_HUNDRED {
                    return Err(DiscountParseError::PercentageOutOfRange(raw.value));
                }

                DiscountKind::Percentage(Percentage::from(raw.value / Decimal::ONE_HUNDRED))
            }
            RawDiscountType::Fixed => DiscountKind::FixedAmount {
                amount_minor: minor_units(raw.value)
                    .ok_or(DiscountParseError::InvalidFixedAmount(raw.value))?,
            },
            RawDiscountType::BuyXGetY => {
                let pay = raw
                    .value
                    .to_u32()
                    .filter(|pay| *pay >= 1 && Decimal::from(*pay) == raw.value)
                    .ok_or(DiscountParseError::InvalidPayThreshold(raw.value))?;

                DiscountKind::BuyXGetY { pay }
            }
        };

        if let (Some(min), Some(max)) = (raw.min_quantity, raw.max_quantity) {
            if max < min {
                return Err(DiscountParseError::InvertedQuantityBounds { min, max });
            }
        }

        Ok(DiscountRule {
            id: raw.id,
            kind,
            min_quantity: raw.min_quantity,
            max_quantity: raw.max_quantity,
            products: raw.items.unwrap_or_default().into_iter().collect(),
            is_active: raw.is_active,
            starts_at: raw.start_date,
            ends_at: raw.end_date,
        })
    }
}

/// Interpret a wire value as a whole, non-negative number of minor units.
fn minor_units(value: Decimal) -> Option<u64> {
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return None;
    }

    value.to_u64()
}
