//! Mutable shopping cart.

use common::{CustomerId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};

use super::CartError;

/// A line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Quantity in the cart.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl CartItem {
    /// Returns the total price for this line (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A customer's shopping cart, priced in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingCart {
    customer_id: Option<CustomerId>,
    currency: Currency,
    items: Vec<CartItem>,
}

impl ShoppingCart {
    /// Creates an anonymous, empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            customer_id: None,
            currency,
            items: Vec::new(),
        }
    }

    /// Creates an empty cart owned by a customer.
    pub fn for_customer(customer_id: CustomerId, currency: Currency) -> Self {
        Self {
            customer_id: Some(customer_id),
            currency,
            items: Vec::new(),
        }
    }

    /// Adds units of a product.
    ///
    /// Adding a product already in the cart increases its quantity and takes
    /// the newer unit price.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                product_id: product_id.to_string(),
            });
        }

        if unit_price.is_negative() {
            return Err(CartError::InvalidPrice {
                product_id: product_id.to_string(),
            });
        }

        if unit_price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch {
                expected: self.currency,
                actual: unit_price.currency(),
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
                existing.unit_price = unit_price;
            }
            None => self.items.push(CartItem {
                product_id,
                quantity,
                unit_price,
            }),
        }

        Ok(())
    }

    /// Builder-style variant of [`add_item`](Self::add_item).
    pub fn with_item(
        mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, CartError> {
        self.add_item(product_id, quantity, unit_price)?;
        Ok(self)
    }

    /// Removes a product from the cart. Returns true if it was present.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() != before
    }

    /// Returns the owning customer, if any.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Returns the cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the cart lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the sum of all line totals.
    pub fn subtotal(&self) -> Money {
        let amount: Decimal = self
            .items
            .iter()
            .map(|i| i.total_price().amount())
            .sum();
        Money::new(amount, self.currency)
    }
}
