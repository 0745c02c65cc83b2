//! Promotion domain events.

use chrono::{DateTime, Utc};
use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::money::Money;

use super::{PromotionId, PromotionRule, PromotionStatus, PromotionType, ValidPeriod};

/// Events that can occur on a promotion aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PromotionEvent {
    /// Promotion was created.
    PromotionCreated(PromotionCreatedData),

    /// Draft promotion was activated.
    PromotionActivated(PromotionActivatedData),

    /// Promotion was withdrawn.
    PromotionDeactivated(PromotionDeactivatedData),

    /// Promotion period elapsed.
    PromotionExpired(PromotionExpiredData),

    /// Promotion was applied to a checkout.
    PromotionUsed(PromotionUsedData),

    /// Usage limit or flash-sale stock was exhausted.
    PromotionDepleted(PromotionDepletedData),
}

impl DomainEvent for PromotionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PromotionEvent::PromotionCreated(_) => "PromotionCreated",
            PromotionEvent::PromotionActivated(_) => "PromotionActivated",
            PromotionEvent::PromotionDeactivated(_) => "PromotionDeactivated",
            PromotionEvent::PromotionExpired(_) => "PromotionExpired",
            PromotionEvent::PromotionUsed(_) => "PromotionUsed",
            PromotionEvent::PromotionDepleted(_) => "PromotionDepleted",
        }
    }
}

/// Data for PromotionCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionCreatedData {
    pub promotion_id: PromotionId,
    pub name: String,
    pub description: Option<String>,
    pub promotion_type: PromotionType,

    /// Status the promotion starts in.
    pub status: PromotionStatus,

    pub valid_period: ValidPeriod,
    pub usage_limit: u32,
    pub rule: PromotionRule,
    pub created_at: DateTime<Utc>,
}

/// Data for PromotionActivated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionActivatedData {
    pub activated_at: DateTime<Utc>,
}

/// Data for PromotionDeactivated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDeactivatedData {
    /// Why the promotion was withdrawn.
    pub reason: String,

    pub deactivated_at: DateTime<Utc>,
}

/// Data for PromotionExpired event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionExpiredData {
    pub expired_at: DateTime<Utc>,
}

/// Data for PromotionUsed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionUsedData {
    /// Customer whose cart used the promotion.
    pub customer_id: Option<CustomerId>,

    /// Discount granted.
    pub discount: Money,

    /// Flash-sale units sold at the special price; zero for other rules.
    pub units: u32,

    pub used_at: DateTime<Utc>,
}

/// Data for PromotionDepleted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDepletedData {
    pub depleted_at: DateTime<Utc>,
}

// Convenience constructors for events
impl PromotionEvent {
    /// Creates a PromotionActivated event.
    pub fn promotion_activated(activated_at: DateTime<Utc>) -> Self {
        PromotionEvent::PromotionActivated(PromotionActivatedData { activated_at })
    }

    /// Creates a PromotionDeactivated event.
    pub fn promotion_deactivated(reason: impl Into<String>, deactivated_at: DateTime<Utc>) -> Self {
        PromotionEvent::PromotionDeactivated(PromotionDeactivatedData {
            reason: reason.into(),
            deactivated_at,
        })
    }

    /// Creates a PromotionExpired event.
    pub fn promotion_expired(expired_at: DateTime<Utc>) -> Self {
        PromotionEvent::PromotionExpired(PromotionExpiredData { expired_at })
    }

    /// Creates a PromotionUsed event.
    pub fn promotion_used(
        customer_id: Option<CustomerId>,
        discount: Money,
        units: u32,
        used_at: DateTime<Utc>,
    ) -> Self {
        PromotionEvent::PromotionUsed(PromotionUsedData {
            customer_id,
            discount,
            units,
            used_at,
        })
    }

    /// Creates a PromotionDepleted event.
    pub fn promotion_depleted(depleted_at: DateTime<Utc>) -> Self {
        PromotionEvent::PromotionDepleted(PromotionDepletedData { depleted_at })
    }

    /// Returns the time the event happened.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PromotionEvent::PromotionCreated(data) => data.created_at,
            PromotionEvent::PromotionActivated(data) => data.activated_at,
            PromotionEvent::PromotionDeactivated(data) => data.deactivated_at,
            PromotionEvent::PromotionExpired(data) => data.expired_at,
            PromotionEvent::PromotionUsed(data) => data.used_at,
            PromotionEvent::PromotionDepleted(data) => data.depleted_at,
        }
    }
}
