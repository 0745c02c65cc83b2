//! JSON input documents: the promotion catalogue and the cart to evaluate.

use std::path::Path;

use common::{CustomerId, ProductId};
use domain::{CreatePromotion, Currency, Money, ShoppingCart};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Promotions to create before evaluating a cart, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionCatalog {
    pub promotions: Vec<CreatePromotion>,
}

impl PromotionCatalog {
    /// Parses a catalogue from JSON.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalogue file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}

/// A cart line as written in the cart document; prices are in the cart currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemDocument {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// A cart as written in the cart document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDocument {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,

    #[serde(default)]
    pub currency: Currency,

    pub items: Vec<CartItemDocument>,
}

impl CartDocument {
    /// Parses a cart document from JSON.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a cart file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Builds the shopping cart, merging repeated products.
    pub fn into_cart(self) -> Result<ShoppingCart, AppError> {
        let mut cart = match self.customer_id {
            Some(customer_id) => ShoppingCart::for_customer(customer_id, self.currency),
            None => ShoppingCart::new(self.currency),
        };

        for item in self.items {
            cart.add_item(
                item.product_id,
                item.quantity,
                Money::new(item.unit_price, self.currency),
            )?;
        }

        Ok(cart)
    }
}
