//! Carts

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{TotalPriceError, total_price},
    products::Product,
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was added with a quantity of zero.
    #[error("Item {0} has a quantity of zero")]
    ZeroQuantity(usize),
}

/// A product together with the quantity being purchased.
#[derive(Debug, Clone)]
pub struct CartItem<'a> {
    product: Product<'a>,
    quantity: u32,
}

impl<'a> CartItem<'a> {
    /// Create a new cart item.
    pub fn new(product: Product<'a>, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Return the product on this line.
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// Return the quantity purchased on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the line total (unit price × quantity) in minor units.
    pub fn line_total_minor(&self) -> i64 {
        self.product.price.to_minor_units() * i64::from(self.quantity)
    }

    /// Return the line total as money.
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.line_total_minor(), self.product.price.currency())
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if an item's currency differs from the cart
    /// currency, or if an item has a quantity of zero.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.product().price.currency();

            if item_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.quantity() == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            Ok(())
        })?;

        Ok(Cart { items, currency })
    }

    /// Iterate over the items in the cart, in line order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// Calculate the subtotal of the cart, quantities included.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&'a self) -> Result<Money<'a, Currency>, TotalPriceError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        total_price(&self.items)
    }

    /// Total quantity across every line in the cart.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(CartItem::quantity).sum()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
