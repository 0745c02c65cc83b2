use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{EventStore, ExpectedVersion, check_batch};
use crate::{EventEnvelope, EventQuery, EventStoreError, Result, Version};

#[derive(Debug, Default)]
struct Log {
    /// Every event in append order.
    entries: Vec<EventEnvelope>,
    /// Latest version of each stream.
    heads: HashMap<String, Version>,
}

impl Log {
    fn head(&self, aggregate_id: &str) -> Version {
        self.heads
            .get(aggregate_id)
            .copied()
            .unwrap_or_else(Version::initial)
    }
}

/// Event store held in process memory.
///
/// Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of events across all streams.
    pub async fn event_count(&self) -> usize {
        self.log.read().await.entries.len()
    }

    /// Returns the number of distinct streams.
    pub async fn stream_count(&self) -> usize {
        self.log.read().await.heads.len()
    }

    pub async fn clear(&self) {
        let mut log = self.log.write().await;
        log.entries.clear();
        log.heads.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        events: Vec<EventEnvelope>,
        expected: ExpectedVersion,
    ) -> Result<Version> {
        check_batch(&events)?;
        let (Some(first), Some(last)) = (events.first(), events.last()) else {
            return Ok(Version::initial());
        };
        let aggregate_id = first.aggregate_id.clone();
        let (first_version, last_version) = (first.version, last.version);

        let mut log = self.log.write().await;
        let head = log.head(&aggregate_id);

        if !expected.accepts(head) {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: head,
            });
        }
        if first_version <= head {
            return Err(EventStoreError::DuplicateVersion {
                aggregate_id,
                version: first_version,
            });
        }

        tracing::debug!(%aggregate_id, count = events.len(), version = %last_version, "events appended");
        log.heads.insert(aggregate_id, last_version);
        log.entries.extend(events);

        Ok(last_version)
    }

    async fn get_events_for_aggregate(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        let mut stream: Vec<EventEnvelope> = EventQuery::for_aggregate(aggregate_id)
            .select(&log.entries)
            .cloned()
            .collect();
        stream.sort_by_key(|e| e.version);
        Ok(stream)
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        Ok(query.select(&log.entries).cloned().collect())
    }

    async fn get_aggregate_version(&self, aggregate_id: &str) -> Result<Option<Version>> {
        Ok(self.log.read().await.heads.get(aggregate_id).copied())
    }
}
