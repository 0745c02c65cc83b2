//! Value objects for the promotion domain.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::PromotionError;

common::string_id!(
    /// Unique identifier for a promotion.
    PromotionId,
    "Promotion ID"
);

/// The kind of discount a promotion grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionType {
    /// Special price on one product, capped by quantity.
    FlashSale,

    /// Percentage off the cart subtotal.
    PercentageOff,

    /// Fixed amount off the cart subtotal.
    FixedAmountOff,
}

impl PromotionType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionType::FlashSale => "FlashSale",
            PromotionType::PercentageOff => "PercentageOff",
            PromotionType::FixedAmountOff => "FixedAmountOff",
        }
    }
}

impl std::fmt::Display for PromotionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive time window during which a promotion may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPeriod {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl ValidPeriod {
    /// Creates a period, rejecting one that does not end after it starts.
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Result<Self, PromotionError> {
        if end_date <= start_date {
            return Err(PromotionError::InvalidParameters {
                reason: format!("end date {end_date} must be after start date {start_date}"),
            });
        }

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Returns the first instant of the period.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Returns the last instant of the period.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Returns true if `at` lies within `[start, end]`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }

    /// Returns true if the period has started at `at`.
    pub fn has_started(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at
    }

    /// Returns true if the period is over at `at`.
    pub fn has_ended(&self, at: DateTime<Utc>) -> bool {
        at > self.end_date
    }

    /// Returns true if the period has not ended at `at` but will within `within`.
    pub fn ends_within(&self, at: DateTime<Utc>, within: Duration) -> bool {
        !self.has_ended(at) && self.end_date <= at + within
    }

    /// Returns the length of the period.
    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }
}
