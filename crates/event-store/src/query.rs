use chrono::{DateTime, Utc};

use crate::EventEnvelope;

/// Filter over stored events. Unset criteria match every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub aggregate_id: Option<String>,
    pub aggregate_type: Option<String>,

    /// Accepted event types; empty accepts all.
    pub event_types: Vec<String>,

    /// Inclusive lower bound on `recorded_at`.
    pub recorded_since: Option<DateTime<Utc>>,

    /// Inclusive upper bound on `recorded_at`.
    pub recorded_until: Option<DateTime<Utc>>,

    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects one aggregate's stream.
    pub fn for_aggregate(aggregate_id: impl Into<String>) -> Self {
        Self {
            aggregate_id: Some(aggregate_id.into()),
            ..Self::default()
        }
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Adds an accepted event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    pub fn recorded_between(
        mut self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        self.recorded_since = since;
        self.recorded_until = until;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the event meets every criterion that is set.
    pub fn matches(&self, event: &EventEnvelope) -> bool {
        self.aggregate_id
            .as_ref()
            .is_none_or(|id| *id == event.aggregate_id)
            && self
                .aggregate_type
                .as_ref()
                .is_none_or(|t| *t == event.aggregate_type)
            && (self.event_types.is_empty() || self.event_types.contains(&event.event_type))
            && self.recorded_since.is_none_or(|since| event.recorded_at >= since)
            && self.recorded_until.is_none_or(|until| event.recorded_at <= until)
    }

    /// Applies the query to events in append order.
    pub fn select<'a>(
        &'a self,
        events: impl IntoIterator<Item = &'a EventEnvelope> + 'a,
    ) -> impl Iterator<Item = &'a EventEnvelope> + 'a {
        events
            .into_iter()
            .filter(|e| self.matches(e))
            .take(self.limit.unwrap_or(usize::MAX))
    }
}
