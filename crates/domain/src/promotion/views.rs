//! Read projections returned by the application service.

use chrono::{DateTime, Duration, Utc};
use common::ProductId;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;

use crate::money::Money;

use super::{Promotion, PromotionId, PromotionRule, PromotionStatus, PromotionType};

/// Read view of a promotion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionView {
    pub id: PromotionId,
    pub name: String,
    pub description: Option<String>,
    pub promotion_type: PromotionType,
    pub status: PromotionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub usage_limit: u32,
    pub usage_count: u32,

    /// Fixed saving per unit (flash sale with a known original price) or per
    /// order (fixed amount). `None` for percentage promotions.
    pub discount_amount: Option<Money>,

    /// Active and below the usage limit.
    pub is_available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromotionView {
    /// Returns true if the promotion is active and `now` lies within its period.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PromotionStatus::Active && self.start_date <= now && now <= self.end_date
    }

    /// Returns the uses left, never negative.
    pub fn remaining_usage(&self) -> u32 {
        self.usage_limit.saturating_sub(self.usage_count)
    }

    /// Returns true if the period ends no later than `within` after `now`.
    pub fn is_expiring_soon_at(&self, now: DateTime<Utc>, within: Duration) -> bool {
        now + within >= self.end_date
    }

    /// Returns the share of the usage limit consumed, in `[0, 100]`.
    pub fn usage_percentage(&self) -> f64 {
        if self.usage_limit == 0 {
            return 0.0;
        }
        (f64::from(self.usage_count) / f64::from(self.usage_limit) * 100.0).clamp(0.0, 100.0)
    }
}

impl From<&Promotion> for PromotionView {
    fn from(promotion: &Promotion) -> Self {
        let discount_amount = match promotion.rule() {
            PromotionRule::FlashSale(rule) => rule
                .original_price
                .and_then(|original| original.checked_sub(rule.special_price).ok()),
            PromotionRule::FixedAmountOff(rule) => Some(rule.amount),
            PromotionRule::PercentageOff(_) => None,
        };

        Self {
            id: promotion.id().clone(),
            name: promotion.name().to_string(),
            description: promotion.description().map(str::to_string),
            promotion_type: promotion.promotion_type(),
            status: promotion.status(),
            start_date: promotion.valid_period().start_date(),
            end_date: promotion.valid_period().end_date(),
            usage_limit: promotion.usage_limit(),
            usage_count: promotion.usage_count(),
            discount_amount,
            is_available: promotion.can_use(),
            created_at: promotion.created_at(),
            updated_at: promotion.updated_at(),
        }
    }
}

/// Read view of a flash sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashSaleView {
    pub promotion_id: PromotionId,
    pub name: String,
    pub product_id: ProductId,
    pub original_price: Option<Money>,
    pub special_price: Money,
    pub quantity_limit: u32,
    pub remaining_quantity: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_available: bool,
}

impl FlashSaleView {
    /// Builds the view for a flash-sale promotion; `None` for other types.
    pub fn from_promotion(promotion: &Promotion) -> Option<Self> {
        let rule = promotion.flash_sale_rule()?;

        Some(Self {
            promotion_id: promotion.id().clone(),
            name: promotion.name().to_string(),
            product_id: rule.target_product_id.clone(),
            original_price: rule.original_price,
            special_price: rule.special_price,
            quantity_limit: rule.quantity_limit,
            remaining_quantity: rule.remaining_quantity(),
            start_date: promotion.valid_period().start_date(),
            end_date: promotion.valid_period().end_date(),
            is_available: promotion.can_use(),
        })
    }

    /// Returns `original − special` when the original price is known.
    pub fn discount_amount(&self) -> Option<Money> {
        self.original_price
            .and_then(|original| original.checked_sub(self.special_price).ok())
    }

    /// Returns the saving as a percentage of the original price, in `[0, 100]`.
    pub fn discount_percentage(&self) -> f64 {
        let Some(original) = self.original_price else {
            return 0.0;
        };
        if original.amount() <= Decimal::ZERO {
            return 0.0;
        }

        let saving = original.amount() - self.special_price.amount();
        let percentage = (saving / original.amount() * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        percentage.to_f64().unwrap_or(0.0)
    }

    /// Returns true if no units remain.
    pub fn is_sold_out(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Returns true if fewer than 20% of the units remain.
    pub fn is_low_stock(&self) -> bool {
        u64::from(self.remaining_quantity) * 5 < u64::from(self.quantity_limit)
    }

    /// Returns true if the sale is available and `now` lies within its period.
    pub fn is_ongoing_at(&self, now: DateTime<Utc>) -> bool {
        self.is_available && self.start_date <= now && now <= self.end_date
    }

    /// Formats a short customer-facing message.
    pub fn format_discount_message(&self) -> String {
        match self.discount_amount() {
            Some(saving) => format!(
                "Flash sale {}, save {} ({:.1}% OFF)",
                self.special_price,
                saving,
                self.discount_percentage()
            ),
            None => format!("Flash sale {}", self.special_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::{
        CreateFixedAmountPromotion, CreateFlashSalePromotion, CreatePercentageOffPromotion,
        PromotionFactory,
    };

    fn flash_sale(original: Option<i64>, special: i64, limit: u32) -> Promotion {
        let start = Utc::now();
        let mut cmd = CreateFlashSalePromotion::new(
            "Flash sale",
            start - Duration::days(1),
            start + Duration::days(10),
            ProductId::of("SKU-001").unwrap(),
            Money::twd(special),
            limit,
        )
        .with_usage_limit(4);
        cmd.original_price = original.map(Money::twd);
        PromotionFactory::create_flash_sale_promotion(cmd, start).unwrap()
    }

    #[test]
    fn test_promotion_view_fields() {
        let promotion = flash_sale(Some(120), 90, 10);
        let view = PromotionView::from(&promotion);

        assert_eq!(view.discount_amount, Some(Money::twd(30)));
        assert!(view.is_available);
        assert!(view.is_active_at(Utc::now()));
        assert_eq!(view.remaining_usage(), 4);
        assert_eq!(view.usage_percentage(), 0.0);
    }

    #[test]
    fn test_promotion_view_usage_and_expiry() {
        let mut view = PromotionView::from(&flash_sale(Some(120), 90, 10));
        view.usage_count = 1;

        assert_eq!(view.usage_percentage(), 25.0);
        assert_eq!(view.remaining_usage(), 3);

        let now = Utc::now();
        assert!(!view.is_expiring_soon_at(now, Duration::days(7)));
        assert!(view.is_expiring_soon_at(now, Duration::days(14)));

        view.usage_count = 9;
        assert_eq!(view.remaining_usage(), 0);
        assert_eq!(view.usage_percentage(), 100.0);
    }

    #[test]
    fn test_discount_amount_by_type() {
        let start = Utc::now();
        let end = start + Duration::days(1);

        let fixed = PromotionFactory::create_fixed_amount_promotion(
            CreateFixedAmountPromotion::new("Fifty off", start, end, Money::twd(50)),
            start,
        )
        .unwrap();
        assert_eq!(
            PromotionView::from(&fixed).discount_amount,
            Some(Money::twd(50))
        );

        let percentage = PromotionFactory::create_percentage_off_promotion(
            CreatePercentageOffPromotion::new("Ten percent", start, end, Decimal::from(10)),
            start,
        )
        .unwrap();
        assert_eq!(PromotionView::from(&percentage).discount_amount, None);
        assert!(FlashSaleView::from_promotion(&percentage).is_none());

        let unknown_original = flash_sale(None, 90, 10);
        assert_eq!(PromotionView::from(&unknown_original).discount_amount, None);
    }

    #[test]
    fn test_flash_sale_view() {
        let view = FlashSaleView::from_promotion(&flash_sale(Some(120), 90, 10)).unwrap();

        assert_eq!(view.discount_amount(), Some(Money::twd(30)));
        assert_eq!(view.discount_percentage(), 25.0);
        assert_eq!(view.remaining_quantity, 10);
        assert!(!view.is_sold_out());
        assert!(!view.is_low_stock());
        assert!(view.is_ongoing_at(Utc::now()));
        assert_eq!(
            view.format_discount_message(),
            "Flash sale TWD 90.00, save TWD 30.00 (25.0% OFF)"
        );
    }

    #[test]
    fn test_flash_sale_stock_levels() {
        let mut view = FlashSaleView::from_promotion(&flash_sale(Some(120), 90, 10)).unwrap();

        view.remaining_quantity = 2;
        assert!(!view.is_low_stock());

        view.remaining_quantity = 1;
        assert!(view.is_low_stock());

        view.remaining_quantity = 0;
        assert!(view.is_sold_out());
    }

    #[test]
    fn test_flash_sale_message_without_original_price() {
        let view = FlashSaleView::from_promotion(&flash_sale(None, 90, 10)).unwrap();
        assert_eq!(view.discount_percentage(), 0.0);
        assert_eq!(view.format_discount_message(), "Flash sale TWD 90.00");
    }
}
