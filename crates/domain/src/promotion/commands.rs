//! Promotion creation commands.

use chrono::{DateTime, Utc};
use common::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::{PromotionId, PromotionType};

/// Command to create a flash-sale promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFlashSalePromotion {
    /// Identifier to use; generated when absent.
    #[serde(default)]
    pub promotion_id: Option<PromotionId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// The product on sale.
    pub product_id: ProductId,

    /// Regular price, when known.
    #[serde(default)]
    pub original_price: Option<Money>,

    pub special_price: Money,
    pub quantity_limit: u32,

    /// Maximum number of uses; unlimited when absent.
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Create in `Draft` instead of `Active`.
    #[serde(default)]
    pub draft: bool,
}

impl CreateFlashSalePromotion {
    /// Creates a new CreateFlashSalePromotion command.
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        product_id: ProductId,
        special_price: Money,
        quantity_limit: u32,
    ) -> Self {
        Self {
            promotion_id: None,
            name: name.into(),
            description: None,
            start_date,
            end_date,
            product_id,
            original_price: None,
            special_price,
            quantity_limit,
            usage_limit: None,
            draft: false,
        }
    }

    /// Sets the regular price.
    pub fn with_original_price(mut self, original_price: Money) -> Self {
        self.original_price = Some(original_price);
        self
    }
}

/// Command to create a percentage-off promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePercentageOffPromotion {
    #[serde(default)]
    pub promotion_id: Option<PromotionId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// Percentage in `(0, 100]`.
    pub percentage: Decimal,

    #[serde(default)]
    pub max_discount: Option<Money>,

    #[serde(default)]
    pub min_purchase: Option<Money>,

    #[serde(default)]
    pub usage_limit: Option<u32>,

    #[serde(default)]
    pub draft: bool,
}

impl CreatePercentageOffPromotion {
    /// Creates a new CreatePercentageOffPromotion command.
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        percentage: Decimal,
    ) -> Self {
        Self {
            promotion_id: None,
            name: name.into(),
            description: None,
            start_date,
            end_date,
            percentage,
            max_discount: None,
            min_purchase: None,
            usage_limit: None,
            draft: false,
        }
    }

    /// Caps the discount.
    pub fn with_max_discount(mut self, max_discount: Money) -> Self {
        self.max_discount = Some(max_discount);
        self
    }

    /// Requires a minimum subtotal.
    pub fn with_min_purchase(mut self, min_purchase: Money) -> Self {
        self.min_purchase = Some(min_purchase);
        self
    }
}

/// Command to create a fixed-amount promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFixedAmountPromotion {
    #[serde(default)]
    pub promotion_id: Option<PromotionId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// Amount taken off the subtotal.
    pub amount: Money,

    #[serde(default)]
    pub min_purchase: Option<Money>,

    #[serde(default)]
    pub usage_limit: Option<u32>,

    #[serde(default)]
    pub draft: bool,
}

impl CreateFixedAmountPromotion {
    /// Creates a new CreateFixedAmountPromotion command.
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        amount: Money,
    ) -> Self {
        Self {
            promotion_id: None,
            name: name.into(),
            description: None,
            start_date,
            end_date,
            amount,
            min_purchase: None,
            usage_limit: None,
            draft: false,
        }
    }

    /// Requires a minimum subtotal.
    pub fn with_min_purchase(mut self, min_purchase: Money) -> Self {
        self.min_purchase = Some(min_purchase);
        self
    }
}

/// Any promotion creation command, tagged by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreatePromotion {
    FlashSale(CreateFlashSalePromotion),
    PercentageOff(CreatePercentageOffPromotion),
    FixedAmountOff(CreateFixedAmountPromotion),
}

impl CreatePromotion {
    /// Returns the type of promotion the command creates.
    pub fn promotion_type(&self) -> PromotionType {
        match self {
            CreatePromotion::FlashSale(_) => PromotionType::FlashSale,
            CreatePromotion::PercentageOff(_) => PromotionType::PercentageOff,
            CreatePromotion::FixedAmountOff(_) => PromotionType::FixedAmountOff,
        }
    }
}

// Setters shared by all creation commands.
macro_rules! common_setters {
    ($($command:ty),+) => {
        $(
            impl $command {
                /// Uses a caller-chosen identifier.
                pub fn with_id(mut self, promotion_id: PromotionId) -> Self {
                    self.promotion_id = Some(promotion_id);
                    self
                }

                /// Sets the description.
                pub fn with_description(mut self, description: impl Into<String>) -> Self {
                    self.description = Some(description.into());
                    self
                }

                /// Limits the number of uses.
                pub fn with_usage_limit(mut self, usage_limit: u32) -> Self {
                    self.usage_limit = Some(usage_limit);
                    self
                }

                /// Creates the promotion in `Draft`.
                pub fn as_draft(mut self) -> Self {
                    self.draft = true;
                    self
                }
            }
        )+
    };
}

common_setters!(
    CreateFlashSalePromotion,
    CreatePercentageOffPromotion,
    CreateFixedAmountPromotion
);
