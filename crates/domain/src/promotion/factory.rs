//! Validated construction of new promotions.

use chrono::{DateTime, Utc};

use super::{
    CreateFixedAmountPromotion, CreateFlashSalePromotion, CreatePercentageOffPromotion,
    CreatePromotion, FixedAmountOffRule, FlashSaleRule, PercentageOffRule, Promotion,
    PromotionError, PromotionId, PromotionRule, PromotionStatus, ValidPeriod,
    events::PromotionCreatedData,
};

/// Builds promotions from creation commands, rejecting any that would break
/// an aggregate invariant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionFactory;

struct Common {
    promotion_id: Option<PromotionId>,
    name: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    usage_limit: Option<u32>,
    draft: bool,
}

impl PromotionFactory {
    /// Creates a promotion of any type.
    pub fn create(command: CreatePromotion, now: DateTime<Utc>) -> Result<Promotion, PromotionError> {
        match command {
            CreatePromotion::FlashSale(cmd) => Self::create_flash_sale_promotion(cmd, now),
            CreatePromotion::PercentageOff(cmd) => Self::create_percentage_off_promotion(cmd, now),
            CreatePromotion::FixedAmountOff(cmd) => Self::create_fixed_amount_promotion(cmd, now),
        }
    }

    /// Creates a flash-sale promotion.
    ///
    /// The special price must be positive and below the original price when
    /// one is given, and the quantity limit must be positive.
    pub fn create_flash_sale_promotion(
        cmd: CreateFlashSalePromotion,
        now: DateTime<Utc>,
    ) -> Result<Promotion, PromotionError> {
        let mut rule = FlashSaleRule::new(cmd.product_id, cmd.special_price, cmd.quantity_limit);
        rule.original_price = cmd.original_price;

        Self::build(
            Common {
                promotion_id: cmd.promotion_id,
                name: cmd.name,
                description: cmd.description,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                usage_limit: cmd.usage_limit,
                draft: cmd.draft,
            },
            PromotionRule::FlashSale(rule),
            now,
        )
    }

    /// Creates a percentage-off promotion.
    pub fn create_percentage_off_promotion(
        cmd: CreatePercentageOffPromotion,
        now: DateTime<Utc>,
    ) -> Result<Promotion, PromotionError> {
        let rule = PercentageOffRule {
            percentage: cmd.percentage,
            max_discount: cmd.max_discount,
            min_purchase: cmd.min_purchase,
        };

        Self::build(
            Common {
                promotion_id: cmd.promotion_id,
                name: cmd.name,
                description: cmd.description,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                usage_limit: cmd.usage_limit,
                draft: cmd.draft,
            },
            PromotionRule::PercentageOff(rule),
            now,
        )
    }

    /// Creates a fixed-amount promotion.
    pub fn create_fixed_amount_promotion(
        cmd: CreateFixedAmountPromotion,
        now: DateTime<Utc>,
    ) -> Result<Promotion, PromotionError> {
        let rule = FixedAmountOffRule {
            amount: cmd.amount,
            min_purchase: cmd.min_purchase,
        };

        Self::build(
            Common {
                promotion_id: cmd.promotion_id,
                name: cmd.name,
                description: cmd.description,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                usage_limit: cmd.usage_limit,
                draft: cmd.draft,
            },
            PromotionRule::FixedAmountOff(rule),
            now,
        )
    }

    fn build(
        common: Common,
        rule: PromotionRule,
        now: DateTime<Utc>,
    ) -> Result<Promotion, PromotionError> {
        let name = common.name.trim();
        if name.is_empty() {
            return Err(PromotionError::InvalidParameters {
                reason: "name cannot be blank".to_string(),
            });
        }

        let usage_limit = common.usage_limit.unwrap_or(u32::MAX);
        if usage_limit == 0 {
            return Err(PromotionError::InvalidParameters {
                reason: "usage limit must be greater than 0".to_string(),
            });
        }

        let valid_period = ValidPeriod::new(common.start_date, common.end_date)?;

        rule.validate()
            .map_err(|violation| PromotionError::InvalidParameters {
                reason: violation.to_string(),
            })?;

        let description = common
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let status = if common.draft {
            PromotionStatus::Draft
        } else {
            PromotionStatus::Active
        };

        Ok(Promotion::create(PromotionCreatedData {
            promotion_id: common.promotion_id.unwrap_or_else(PromotionId::generate),
            name: name.to_string(),
            description,
            promotion_type: rule.promotion_type(),
            status,
            valid_period,
            usage_limit,
            rule,
            created_at: now,
        }))
    }
}
