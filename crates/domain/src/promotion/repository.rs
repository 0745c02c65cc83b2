//! Promotion persistence seam and its in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use event_store::Version;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::aggregate::Aggregate;

use super::{Promotion, PromotionId, PromotionStatus, PromotionType};

/// Errors that can occur while loading or saving promotions.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The stored promotion changed since it was loaded.
    #[error(
        "Concurrency conflict for promotion {promotion_id}: expected {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        promotion_id: String,
        expected: Version,
        actual: Version,
    },

    /// The backing store could not be reached.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Loads and saves promotion aggregates.
///
/// Listing methods return promotions in the repository's own order, which
/// callers preserve. The filtering methods have default implementations on
/// top of [`find_all`](PromotionRepository::find_all).
#[async_trait]
pub trait PromotionRepository: Send + Sync {
    /// Returns the promotion with the given id, if stored.
    async fn find_by_id(&self, id: &PromotionId) -> Result<Option<Promotion>, RepositoryError>;

    /// Returns every stored promotion.
    async fn find_all(&self) -> Result<Vec<Promotion>, RepositoryError>;

    /// Saves a promotion and returns the stored copy.
    ///
    /// The stored version must equal the promotion's committed version, i.e.
    /// the version it was loaded at. New promotions must not be stored yet.
    async fn save(&self, promotion: &Promotion) -> Result<Promotion, RepositoryError>;

    /// Returns promotions that are `Active` with `at` inside their period.
    async fn find_active_promotions(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Vec<Promotion>, RepositoryError> {
        let all = self.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.status().is_active() && p.valid_period().contains(at))
            .collect())
    }

    /// Returns promotions of a type.
    async fn find_by_type(
        &self,
        promotion_type: PromotionType,
    ) -> Result<Vec<Promotion>, RepositoryError> {
        let all = self.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.promotion_type() == promotion_type)
            .collect())
    }

    /// Returns promotions in a status.
    async fn find_by_status(
        &self,
        status: PromotionStatus,
    ) -> Result<Vec<Promotion>, RepositoryError> {
        let all = self.find_all().await?;
        Ok(all.into_iter().filter(|p| p.status() == status).collect())
    }

    /// Returns active promotions whose period ends within `within` of `at`.
    async fn find_expiring_soon(
        &self,
        at: DateTime<Utc>,
        within: Duration,
    ) -> Result<Vec<Promotion>, RepositoryError> {
        let all = self.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.status().is_active() && p.valid_period().ends_within(at, within))
            .collect())
    }
}

/// In-memory promotion repository.
///
/// Keeps promotions in insertion order; updates replace in place.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromotionRepository {
    promotions: Arc<RwLock<Vec<Promotion>>>,
}

impl InMemoryPromotionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored promotions.
    pub async fn len(&self) -> usize {
        self.promotions.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.promotions.read().await.is_empty()
    }
}

#[async_trait]
impl PromotionRepository for InMemoryPromotionRepository {
    async fn find_by_id(&self, id: &PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let promotions = self.promotions.read().await;
        Ok(promotions.iter().find(|p| p.id() == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Promotion>, RepositoryError> {
        Ok(self.promotions.read().await.clone())
    }

    async fn save(&self, promotion: &Promotion) -> Result<Promotion, RepositoryError> {
        let expected = promotion.committed_version();

        let mut stored = promotion.clone();
        stored.take_pending_events();

        let mut promotions = self.promotions.write().await;
        match promotions.iter().position(|p| p.id() == promotion.id()) {
            Some(index) => {
                let actual = promotions[index].version();
                if actual != expected {
                    return Err(RepositoryError::ConcurrencyConflict {
                        promotion_id: promotion.id().to_string(),
                        expected,
                        actual,
                    });
                }
                promotions[index] = stored.clone();
            }
            None => {
                if expected != Version::initial() {
                    return Err(RepositoryError::ConcurrencyConflict {
                        promotion_id: promotion.id().to_string(),
                        expected,
                        actual: Version::initial(),
                    });
                }
                promotions.push(stored.clone());
            }
        }

        tracing::debug!(promotion_id = %promotion.id(), version = %stored.version(), "promotion saved");
        Ok(stored)
    }
}
