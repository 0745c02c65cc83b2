//! Read-only cart snapshot.

use common::{CustomerId, ProductId};
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};

use super::ShoppingCart;

/// One product line of a [`CartSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Snapshot of a shopping cart taken for a single evaluation.
///
/// All lines share the summary currency, and `subtotal` is the sum of the
/// line subtotals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    customer_id: Option<CustomerId>,
    currency: Currency,
    lines: Vec<CartLine>,
    subtotal: Money,
}

impl CartSummary {
    /// Returns an empty summary.
    pub fn empty(currency: Currency) -> Self {
        Self {
            customer_id: None,
            currency,
            lines: Vec::new(),
            subtotal: Money::zero(currency),
        }
    }

    /// Returns the customer the cart belongs to, if any.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Returns the currency every line is priced in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the product lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the cart subtotal before discounts.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Returns the quantity of a product, zero when absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    /// Returns the number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

impl From<&ShoppingCart> for CartSummary {
    fn from(cart: &ShoppingCart) -> Self {
        let lines = cart
            .items()
            .iter()
            .map(|item| CartLine {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.total_price(),
            })
            .collect();

        Self {
            customer_id: cart.customer_id().cloned(),
            currency: cart.currency(),
            lines,
            subtotal: cart.subtotal(),
        }
    }
}
