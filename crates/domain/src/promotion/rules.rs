//! Discount rules attached to promotions.
//!
//! Each rule answers two questions about a [`CartSummary`]: whether the cart is
//! eligible, and how much the rule takes off it. Discount computation is pure
//! and never exceeds the money the rule applies to.

use common::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartSummary;
use crate::money::Money;

use super::{DiscountScope, PromotionType};

/// A structural defect in a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleViolation(pub String);

impl RuleViolation {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Special price on one product, capped by quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashSaleRule {
    /// The product on sale.
    pub target_product_id: ProductId,

    /// Price per unit during the sale.
    pub special_price: Money,

    /// Regular price, when known. Discounts are taken from it; without it the
    /// cart's unit price stands in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,

    /// Units available at the special price.
    pub quantity_limit: u32,

    /// Units already sold at the special price.
    #[serde(default)]
    pub units_sold: u32,
}

impl FlashSaleRule {
    /// Creates a rule with nothing sold yet.
    pub fn new(target_product_id: ProductId, special_price: Money, quantity_limit: u32) -> Self {
        Self {
            target_product_id,
            special_price,
            original_price: None,
            quantity_limit,
            units_sold: 0,
        }
    }

    /// Sets the regular price.
    pub fn with_original_price(mut self, original_price: Money) -> Self {
        self.original_price = Some(original_price);
        self
    }

    /// Returns the units still available at the special price.
    pub fn remaining_quantity(&self) -> u32 {
        self.quantity_limit.saturating_sub(self.units_sold)
    }

    /// Returns true if no units remain.
    pub fn is_sold_out(&self) -> bool {
        self.remaining_quantity() == 0
    }

    /// Checks the rule's own invariants.
    pub fn validate(&self) -> Result<(), RuleViolation> {
        if !self.special_price.is_positive() {
            return Err(RuleViolation::new("special price must be greater than 0"));
        }
        if self.quantity_limit == 0 {
            return Err(RuleViolation::new("quantity limit must be greater than 0"));
        }
        if self.units_sold > self.quantity_limit {
            return Err(RuleViolation::new("units sold exceed the quantity limit"));
        }
        if let Some(original) = self.original_price {
            if !original.same_currency(&self.special_price) {
                return Err(RuleViolation::new(
                    "original and special price must share a currency",
                ));
            }
            if self.special_price.amount() >= original.amount() {
                return Err(RuleViolation::new(
                    "special price must be lower than the original price",
                ));
            }
        }
        Ok(())
    }

    /// Returns true if the target product is in the cart and units remain.
    pub fn is_eligible(&self, cart: &CartSummary) -> bool {
        self.special_price.currency() == cart.currency()
            && cart.quantity_of(&self.target_product_id) > 0
            && self.remaining_quantity() > 0
    }

    /// Returns how many cart units get the special price.
    pub fn discounted_units(&self, cart: &CartSummary) -> u32 {
        if !self.is_eligible(cart) {
            return 0;
        }
        cart.quantity_of(&self.target_product_id)
            .min(self.remaining_quantity())
    }

    /// Returns `(original price − special price) × discounted units`, never
    /// more than the target line's subtotal and never negative. The cart's unit
    /// price is the base when the rule has no original price.
    pub fn discount_for(&self, cart: &CartSummary) -> Money {
        let zero = Money::zero(cart.currency());
        let Some(line) = cart.line(&self.target_product_id) else {
            return zero;
        };
        if !self.is_eligible(cart) {
            return zero;
        }

        let base = self.original_price.unwrap_or(line.unit_price);
        let per_unit = base.amount() - self.special_price.amount();
        if per_unit <= Decimal::ZERO {
            return zero;
        }

        let discount = per_unit * Decimal::from(self.discounted_units(cart));
        Money::new(discount.min(line.subtotal.amount()), cart.currency())
    }
}

/// Percentage off the cart subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageOffRule {
    /// Percentage in `(0, 100]`.
    pub percentage: Decimal,

    /// Upper bound on the discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Money>,

    /// Subtotal the cart must reach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase: Option<Money>,
}

impl PercentageOffRule {
    pub fn validate(&self) -> Result<(), RuleViolation> {
        if self.percentage <= Decimal::ZERO || self.percentage > Decimal::ONE_HUNDRED {
            return Err(RuleViolation::new(format!(
                "percentage {} must be within (0, 100]",
                self.percentage
            )));
        }
        if let Some(max) = self.max_discount
            && !max.is_positive()
        {
            return Err(RuleViolation::new("maximum discount must be greater than 0"));
        }
        if let Some(min) = self.min_purchase
            && min.is_negative()
        {
            return Err(RuleViolation::new("minimum purchase must not be negative"));
        }
        if let (Some(max), Some(min)) = (self.max_discount, self.min_purchase)
            && !max.same_currency(&min)
        {
            return Err(RuleViolation::new(
                "maximum discount and minimum purchase must share a currency",
            ));
        }
        Ok(())
    }

    pub fn is_eligible(&self, cart: &CartSummary) -> bool {
        let currency_matches = [self.max_discount, self.min_purchase]
            .into_iter()
            .flatten()
            .all(|m| m.currency() == cart.currency());

        currency_matches
            && !cart.is_empty()
            && meets_minimum(self.min_purchase, cart.subtotal())
    }

    /// Returns the percentage of the subtotal, capped at `max_discount`.
    pub fn discount_for(&self, cart: &CartSummary) -> Money {
        if !self.is_eligible(cart) {
            return Money::zero(cart.currency());
        }

        let subtotal = cart.subtotal();
        let mut discount = subtotal.percentage(self.percentage).amount();
        if let Some(max) = self.max_discount {
            discount = discount.min(max.amount());
        }
        Money::new(discount.min(subtotal.amount()), cart.currency())
    }
}

/// Fixed amount off the cart subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAmountOffRule {
    /// Amount taken off.
    pub amount: Money,

    /// Subtotal the cart must reach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase: Option<Money>,
}

impl FixedAmountOffRule {
    pub fn validate(&self) -> Result<(), RuleViolation> {
        if !self.amount.is_positive() {
            return Err(RuleViolation::new("discount amount must be greater than 0"));
        }
        if let Some(min) = self.min_purchase {
            if !min.same_currency(&self.amount) {
                return Err(RuleViolation::new(
                    "discount amount and minimum purchase must share a currency",
                ));
            }
            if min.is_negative() {
                return Err(RuleViolation::new("minimum purchase must not be negative"));
            }
        }
        Ok(())
    }

    pub fn is_eligible(&self, cart: &CartSummary) -> bool {
        self.amount.currency() == cart.currency()
            && !cart.is_empty()
            && meets_minimum(self.min_purchase, cart.subtotal())
    }

    /// Returns the fixed amount, never more than the subtotal.
    pub fn discount_for(&self, cart: &CartSummary) -> Money {
        if !self.is_eligible(cart) {
            return Money::zero(cart.currency());
        }
        Money::new(
            self.amount.amount().min(cart.subtotal().amount()),
            cart.currency(),
        )
    }
}

fn meets_minimum(min_purchase: Option<Money>, subtotal: Money) -> bool {
    min_purchase.is_none_or(|min| subtotal.amount() >= min.amount())
}

/// The rule a promotion applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionRule {
    FlashSale(FlashSaleRule),
    PercentageOff(PercentageOffRule),
    FixedAmountOff(FixedAmountOffRule),
}

impl PromotionRule {
    /// Returns the promotion type this rule belongs to.
    pub fn promotion_type(&self) -> PromotionType {
        match self {
            PromotionRule::FlashSale(_) => PromotionType::FlashSale,
            PromotionRule::PercentageOff(_) => PromotionType::PercentageOff,
            PromotionRule::FixedAmountOff(_) => PromotionType::FixedAmountOff,
        }
    }

    pub fn validate(&self) -> Result<(), RuleViolation> {
        match self {
            PromotionRule::FlashSale(rule) => rule.validate(),
            PromotionRule::PercentageOff(rule) => rule.validate(),
            PromotionRule::FixedAmountOff(rule) => rule.validate(),
        }
    }

    /// Returns true if the rule-specific conditions hold for the cart.
    pub fn is_eligible(&self, cart: &CartSummary) -> bool {
        match self {
            PromotionRule::FlashSale(rule) => rule.is_eligible(cart),
            PromotionRule::PercentageOff(rule) => rule.is_eligible(cart),
            PromotionRule::FixedAmountOff(rule) => rule.is_eligible(cart),
        }
    }

    /// Returns the discount the rule grants, zero when the cart is not eligible.
    pub fn discount_for(&self, cart: &CartSummary) -> Money {
        match self {
            PromotionRule::FlashSale(rule) => rule.discount_for(cart),
            PromotionRule::PercentageOff(rule) => rule.discount_for(cart),
            PromotionRule::FixedAmountOff(rule) => rule.discount_for(cart),
        }
    }

    /// Returns the part of the cart the discount is taken from.
    pub fn scope(&self) -> DiscountScope {
        match self {
            PromotionRule::FlashSale(rule) => DiscountScope::Product(rule.target_product_id.clone()),
            PromotionRule::PercentageOff(_) | PromotionRule::FixedAmountOff(_) => {
                DiscountScope::WholeCart
            }
        }
    }

    /// Returns the flash-sale rule, if this is one.
    pub fn as_flash_sale(&self) -> Option<&FlashSaleRule> {
        match self {
            PromotionRule::FlashSale(rule) => Some(rule),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ShoppingCart;
    use crate::money::Currency;

    fn sku(id: &str) -> ProductId {
        ProductId::of(id).unwrap()
    }

    fn cart(lines: &[(&str, u32, i64)]) -> CartSummary {
        let mut cart = ShoppingCart::new(Currency::Twd);
        for (id, quantity, price) in lines {
            cart.add_item(sku(id), *quantity, Money::twd(*price)).unwrap();
        }
        CartSummary::from(&cart)
    }

    fn flash_sale(limit: u32) -> FlashSaleRule {
        FlashSaleRule::new(sku("SKU-001"), Money::twd(90), limit).with_original_price(Money::twd(120))
    }

    #[test]
    fn test_flash_sale_discount_per_unit() {
        let rule = flash_sale(10);
        let cart = cart(&[("SKU-001", 3, 120)]);

        assert!(rule.is_eligible(&cart));
        assert_eq!(rule.discount_for(&cart), Money::twd(90));
    }

    #[test]
    fn test_flash_sale_caps_units_at_quantity_limit() {
        let rule = flash_sale(2);
        let cart = cart(&[("SKU-001", 5, 120)]);

        assert_eq!(rule.discounted_units(&cart), 2);
        assert_eq!(rule.discount_for(&cart), Money::twd(60));
    }

    #[test]
    fn test_flash_sale_uses_remaining_quantity() {
        let mut rule = flash_sale(10);
        rule.units_sold = 9;
        let cart = cart(&[("SKU-001", 3, 120)]);

        assert_eq!(rule.remaining_quantity(), 1);
        assert_eq!(rule.discount_for(&cart), Money::twd(30));

        rule.units_sold = 10;
        assert!(rule.is_sold_out());
        assert!(!rule.is_eligible(&cart));
        assert!(rule.discount_for(&cart).is_zero());
    }

    #[test]
    fn test_flash_sale_needs_target_in_cart() {
        let rule = flash_sale(10);
        let cart = cart(&[("SKU-002", 3, 120)]);

        assert!(!rule.is_eligible(&cart));
        assert!(rule.discount_for(&cart).is_zero());
    }

    #[test]
    fn test_flash_sale_takes_original_price_over_cart_price() {
        let rule = flash_sale(10);
        let cart = cart(&[("SKU-001", 3, 100)]);

        assert_eq!(rule.discount_for(&cart), Money::twd(90));
    }

    #[test]
    fn test_flash_sale_clamped_to_line_subtotal() {
        let rule = FlashSaleRule::new(sku("SKU-001"), Money::twd(10), 10)
            .with_original_price(Money::twd(120));
        let cart = cart(&[("SKU-001", 2, 50)]);

        // 110 × 2 exceeds the 100 the line costs
        assert_eq!(rule.discount_for(&cart), Money::twd(100));
    }

    #[test]
    fn test_flash_sale_falls_back_to_cart_price() {
        let rule = FlashSaleRule::new(sku("SKU-001"), Money::twd(90), 10);

        assert_eq!(rule.discount_for(&cart(&[("SKU-001", 3, 100)])), Money::twd(30));
        assert!(rule.discount_for(&cart(&[("SKU-001", 3, 80)])).is_zero());
    }

    #[test]
    fn test_flash_sale_validation() {
        assert!(flash_sale(10).validate().is_ok());
        assert!(flash_sale(0).validate().is_err());
        assert!(
            FlashSaleRule::new(sku("SKU-001"), Money::twd(0), 1)
                .validate()
                .is_err()
        );
        assert!(
            FlashSaleRule::new(sku("SKU-001"), Money::twd(120), 1)
                .with_original_price(Money::twd(120))
                .validate()
                .is_err()
        );
        assert!(
            FlashSaleRule::new(sku("SKU-001"), Money::twd(90), 1)
                .with_original_price(Money::usd(120))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_percentage_off_with_cap_and_minimum() {
        let rule = PercentageOffRule {
            percentage: Decimal::from(10),
            max_discount: Some(Money::twd(50)),
            min_purchase: Some(Money::twd(300)),
        };

        assert_eq!(rule.discount_for(&cart(&[("SKU-001", 3, 120)])), Money::twd(36));
        assert_eq!(rule.discount_for(&cart(&[("SKU-001", 10, 120)])), Money::twd(50));
        assert!(!rule.is_eligible(&cart(&[("SKU-001", 1, 120)])));
        assert!(rule.discount_for(&cart(&[("SKU-001", 1, 120)])).is_zero());
    }

    #[test]
    fn test_percentage_off_validation() {
        let rule = |pct: i64| PercentageOffRule {
            percentage: Decimal::from(pct),
            max_discount: None,
            min_purchase: None,
        };

        assert!(rule(100).validate().is_ok());
        assert!(rule(0).validate().is_err());
        assert!(rule(101).validate().is_err());
    }

    #[test]
    fn test_fixed_amount_clamped_to_subtotal() {
        let rule = FixedAmountOffRule {
            amount: Money::twd(500),
            min_purchase: None,
        };

        assert_eq!(rule.discount_for(&cart(&[("SKU-001", 3, 120)])), Money::twd(360));
        assert!(rule.discount_for(&CartSummary::empty(Currency::Twd)).is_zero());
    }

    #[test]
    fn test_foreign_currency_cart_is_not_eligible() {
        let rule = FixedAmountOffRule {
            amount: Money::usd(5),
            min_purchase: None,
        };

        assert!(!rule.is_eligible(&cart(&[("SKU-001", 1, 120)])));
    }

    #[test]
    fn test_rule_scope_and_type() {
        let rule = PromotionRule::FlashSale(flash_sale(10));
        assert_eq!(rule.promotion_type(), PromotionType::FlashSale);
        assert_eq!(rule.scope(), DiscountScope::Product(sku("SKU-001")));
        assert!(rule.as_flash_sale().is_some());

        let rule = PromotionRule::FixedAmountOff(FixedAmountOffRule {
            amount: Money::twd(10),
            min_purchase: None,
        });
        assert_eq!(rule.scope(), DiscountScope::WholeCart);
        assert!(rule.as_flash_sale().is_none());
    }

    #[test]
    fn test_rule_serialization_is_tagged() {
        let rule = PromotionRule::FlashSale(flash_sale(10));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "flash_sale");

        let back: PromotionRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
