//! Promotion status state machine.

use serde::{Deserialize, Serialize};

/// The status of a promotion in its lifecycle.
///
/// State transitions:
/// ```text
/// Draft ──► Active ──┬──► Expired
///   │         │      └──► Depleted
///   └─────────┴─────────► Inactive
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PromotionStatus {
    /// Prepared but not yet running.
    #[default]
    Draft,

    /// Running; may be applied to carts within its period.
    Active,

    /// Withdrawn by an administrator (terminal state).
    Inactive,

    /// Its period has elapsed (terminal state).
    Expired,

    /// Usage limit or stock exhausted (terminal state).
    Depleted,
}

impl PromotionStatus {
    /// Returns true if the promotion can be activated in this status.
    pub fn can_activate(&self) -> bool {
        matches!(self, PromotionStatus::Draft)
    }

    /// Returns true if the promotion can be deactivated in this status.
    pub fn can_deactivate(&self) -> bool {
        matches!(self, PromotionStatus::Draft | PromotionStatus::Active)
    }

    /// Returns true if the promotion can expire in this status.
    pub fn can_expire(&self) -> bool {
        matches!(self, PromotionStatus::Active)
    }

    /// Returns true if usage can be recorded in this status.
    pub fn can_record_usage(&self) -> bool {
        matches!(self, PromotionStatus::Active)
    }

    /// Returns true if the status is active.
    pub fn is_active(&self) -> bool {
        matches!(self, PromotionStatus::Active)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PromotionStatus::Inactive | PromotionStatus::Expired | PromotionStatus::Depleted
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::Draft => "Draft",
            PromotionStatus::Active => "Active",
            PromotionStatus::Inactive => "Inactive",
            PromotionStatus::Expired => "Expired",
            PromotionStatus::Depleted => "Depleted",
        }
    }
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
