//! Shopping cart and the read-only summary used for promotion evaluation.

mod converter;
mod shopping_cart;
mod summary;

pub use converter::{CartSummaryConverter, DefaultCartSummaryConverter};
pub use shopping_cart::{CartItem, ShoppingCart};
pub use summary::{CartLine, CartSummary};

use thiserror::Error;

use crate::money::Currency;

/// Errors that can occur while filling a shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity must be greater than zero.
    #[error("Invalid quantity for {product_id}: must be greater than 0")]
    InvalidQuantity { product_id: String },

    /// Unit price must not be negative.
    #[error("Invalid unit price for {product_id}: must not be negative")]
    InvalidPrice { product_id: String },

    /// Item is priced in a currency other than the cart's.
    #[error("Currency mismatch: cart is in {expected}, item is in {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },
}
