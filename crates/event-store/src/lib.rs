//! Append-only log of published domain events.
//!
//! Aggregates record events while handling commands. Once the aggregate is
//! saved its events are wrapped in [`EventEnvelope`]s and appended to the
//! aggregate's stream, where readers can fetch them by aggregate, by type or
//! through an [`EventQuery`].

pub mod error;
pub mod event;
pub mod memory;
pub mod query;
pub mod store;

pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventId, Version};
pub use memory::InMemoryEventStore;
pub use query::EventQuery;
pub use store::{EventStore, ExpectedVersion, check_batch};
