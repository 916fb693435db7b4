//! Filigree prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cache::DiscountCache,
    carts::{Cart, CartError, CartItem},
    discounts::{
        DiscountError, DiscountId, DiscountKind, DiscountRule, DiscountType,
        bundle::{BundleHint, BundleSavings, bundle_savings},
        percent_of_minor,
        wire::{DiscountParseError, RawDiscount, RawDiscountType},
    },
    engine::{DEFAULT_LOOKUP_TIMEOUT, DiscountEngine},
    pricing::{TotalPriceError, total_price},
    products::{Product, ProductId},
    repository::{DiscountLookupError, DiscountRepository, InMemoryDiscountRepository},
    resolution::{
        AppliedDiscount, CartResolution, ResolveError,
        lines::{LineDiscount, LineResolution, resolve_line_discounts},
        resolve_cart_discount,
    },
};
