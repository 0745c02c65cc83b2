use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Random identifier given to every stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position of an event within its aggregate's stream.
///
/// A stream with nothing in it is at version 0; its first event is version 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Version of an empty stream.
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Version of a stream's first event.
    pub const fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Steps back `count` events, stopping at the empty-stream version.
    pub fn rewind(&self, count: usize) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(count).max(0))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A published domain event together with the stream position it was stored at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub version: Version,

    /// Name of the event variant, e.g. `PromotionUsed`.
    pub event_type: String,

    pub recorded_at: DateTime<Utc>,
    pub payload: serde_json::Value,

    /// Ties together events raised by the same request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl EventEnvelope {
    /// Wraps an already encoded payload, stamped with the current time.
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        version: Version,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            version,
            event_type: event_type.into(),
            recorded_at: Utc::now(),
            payload,
            correlation_id: None,
        }
    }

    /// Serializes `event` into a new envelope.
    pub fn encode<E: Serialize>(
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        version: Version,
        event_type: impl Into<String>,
        event: &E,
    ) -> Result<Self> {
        let payload = serde_json::to_value(event)?;
        Ok(Self::new(
            aggregate_type,
            aggregate_id,
            version,
            event_type,
            payload,
        ))
    }

    /// Deserializes the payload back into a domain event.
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E> {
        Ok(E::deserialize(&self.payload)?)
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}
