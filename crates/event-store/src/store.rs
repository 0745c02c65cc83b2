use std::fmt;

use async_trait::async_trait;

use crate::{EventEnvelope, EventQuery, EventStoreError, Result, Version};

/// Stream position a writer expects before its batch is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedVersion {
    /// No expectation; only duplicate versions are refused.
    #[default]
    Any,
    /// The stream must not hold any event yet.
    NoStream,
    /// The stream must be exactly at this version.
    Exact(Version),
}

impl ExpectedVersion {
    /// Returns true if a stream at `current` satisfies the expectation.
    pub fn accepts(&self, current: Version) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => current == Version::initial(),
            ExpectedVersion::Exact(expected) => current == *expected,
        }
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedVersion::Any => f.write_str("any version"),
            ExpectedVersion::NoStream => f.write_str("no stream"),
            ExpectedVersion::Exact(version) => version.fmt(f),
        }
    }
}

/// Append-only storage for published domain events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch to one aggregate's stream, all or nothing.
    ///
    /// Returns the stream version after the batch.
    async fn append(
        &self,
        events: Vec<EventEnvelope>,
        expected: ExpectedVersion,
    ) -> Result<Version>;

    /// Returns an aggregate's events ordered by version.
    async fn get_events_for_aggregate(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>>;

    /// Returns matching events in the order they were appended.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        self.query_events(EventQuery::new().event_type(event_type))
            .await
    }

    /// Returns the stream version, or `None` for an aggregate with no events.
    async fn get_aggregate_version(&self, aggregate_id: &str) -> Result<Option<Version>>;
}

/// Checks that a batch is non-empty, targets one aggregate and numbers its
/// events consecutively.
pub fn check_batch(events: &[EventEnvelope]) -> Result<()> {
    let Some(head) = events.first() else {
        return Err(EventStoreError::InvalidBatch("batch is empty".to_string()));
    };

    if let Some(stray) = events.iter().find(|e| {
        e.aggregate_id != head.aggregate_id || e.aggregate_type != head.aggregate_type
    }) {
        return Err(EventStoreError::InvalidBatch(format!(
            "batch for {} {} also holds an event of {} {}",
            head.aggregate_type, head.aggregate_id, stray.aggregate_type, stray.aggregate_id
        )));
    }

    for pair in events.windows(2) {
        if pair[1].version != pair[0].version.next() {
            return Err(EventStoreError::InvalidBatch(format!(
                "{} follows {}; versions must be consecutive",
                pair[1].version, pair[0].version
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(aggregate_id: &str, version: i64) -> EventEnvelope {
        EventEnvelope::new(
            "Promotion",
            aggregate_id,
            Version::new(version),
            "PromotionUsed",
            serde_json::Value::Null,
        )
    }

    #[test]
    fn expectations() {
        assert!(ExpectedVersion::Any.accepts(Version::new(9)));
        assert!(ExpectedVersion::NoStream.accepts(Version::initial()));
        assert!(!ExpectedVersion::NoStream.accepts(Version::first()));
        assert!(ExpectedVersion::Exact(Version::new(2)).accepts(Version::new(2)));
        assert!(!ExpectedVersion::Exact(Version::new(2)).accepts(Version::new(3)));
        assert_eq!(ExpectedVersion::Exact(Version::new(2)).to_string(), "v2");
    }

    #[test]
    fn consecutive_batch_passes() {
        assert!(check_batch(&[at("promo-1", 3), at("promo-1", 4), at("promo-1", 5)]).is_ok());
    }

    #[test]
    fn empty_batch_fails() {
        assert!(matches!(check_batch(&[]), Err(EventStoreError::InvalidBatch(_))));
    }

    #[test]
    fn mixed_aggregates_fail() {
        assert!(check_batch(&[at("promo-1", 1), at("promo-2", 2)]).is_err());
    }

    #[test]
    fn gaps_and_repeats_fail() {
        assert!(check_batch(&[at("promo-1", 1), at("promo-1", 3)]).is_err());
        assert!(check_batch(&[at("promo-1", 2), at("promo-1", 2)]).is_err());
    }
}
