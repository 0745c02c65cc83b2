//! Promotion aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod factory;
mod repository;
mod rules;
mod service;
mod stacking;
mod state;
mod value_objects;
mod views;

pub use aggregate::Promotion;
pub use commands::*;
pub use events::{
    PromotionActivatedData, PromotionCreatedData, PromotionDeactivatedData,
    PromotionDepletedData, PromotionEvent, PromotionExpiredData, PromotionUsedData,
};
pub use factory::PromotionFactory;
pub use repository::{InMemoryPromotionRepository, PromotionRepository, RepositoryError};
pub use rules::{FixedAmountOffRule, FlashSaleRule, PercentageOffRule, PromotionRule, RuleViolation};
pub use service::PromotionApplicationService;
pub use stacking::{DiscountScope, PromotionDiscount, StackingPolicy};
pub use state::PromotionStatus;
pub use value_objects::{PromotionId, PromotionType, ValidPeriod};
pub use views::{FlashSaleView, PromotionView};

use common::IdError;
use thiserror::Error;

use crate::money::MoneyError;

/// Errors that can occur during promotion operations.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// No promotion with this id exists.
    #[error("Promotion not found: {promotion_id}")]
    NotFound { promotion_id: String },

    /// Creation parameters break a promotion invariant.
    #[error("Invalid promotion parameters: {reason}")]
    InvalidParameters { reason: String },

    /// A stored rule is malformed or does not match the promotion type.
    #[error("Invalid rule on promotion {promotion_id}: {reason}")]
    InvalidRule {
        promotion_id: String,
        reason: String,
    },

    /// Promotion is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: PromotionStatus,
        action: &'static str,
    },

    /// A replayed event history cannot rebuild a promotion.
    #[error("Corrupt promotion history: {reason}")]
    CorruptHistory { reason: String },

    /// The promotion does not apply to the cart.
    #[error("Promotion {promotion_id} does not apply to this cart")]
    NotApplicable { promotion_id: String },

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// An identifier was invalid.
    #[error(transparent)]
    Identifier(#[from] IdError),
}
