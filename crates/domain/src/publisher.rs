//! Publication of recorded domain events.

use event_store::{EventEnvelope, EventStore, ExpectedVersion, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Publishes the events an aggregate has recorded to an [`EventStore`].
pub struct DomainEventApplicationService<S: EventStore> {
    store: S,
}

impl<S: EventStore> DomainEventApplicationService<S> {
    /// Creates a publisher over the given event store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends the aggregate's pending events and clears them.
    ///
    /// Events are numbered from the aggregate's committed version. The stream may
    /// lag behind the aggregate after an earlier failed publication, so any stream
    /// version below the first new event is accepted. On failure the pending
    /// events are kept so the caller can decide what to do with them.
    /// Returns the aggregate version after publication.
    #[tracing::instrument(skip(self, aggregate), fields(aggregate_id = %aggregate.aggregate_id()))]
    pub async fn publish_events_from_aggregate<A: Aggregate>(
        &self,
        aggregate: &mut A,
    ) -> Result<Version, DomainError> {
        if aggregate.pending_events().is_empty() {
            return Ok(aggregate.version());
        }

        let envelopes = build_envelopes(
            &aggregate.aggregate_id(),
            aggregate.committed_version(),
            aggregate.pending_events(),
            A::aggregate_type(),
        )?;
        let count = envelopes.len();

        let version = self.store.append(envelopes, ExpectedVersion::Any).await?;
        aggregate.take_pending_events();

        tracing::debug!(count, %version, "published domain events");
        Ok(version)
    }
}

/// Builds event envelopes from domain events, numbering them after `committed`.
fn build_envelopes<E: DomainEvent>(
    aggregate_id: &str,
    committed: Version,
    events: &[E],
    aggregate_type: &str,
) -> Result<Vec<EventEnvelope>, DomainError> {
    let mut envelopes = Vec::with_capacity(events.len());
    let mut version = committed;

    for event in events {
        version = version.next();
        envelopes.push(EventEnvelope::encode(
            aggregate_type,
            aggregate_id,
            version,
            event.event_type(),
            event,
        )?);
    }

    Ok(envelopes)
}
