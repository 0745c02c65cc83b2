//! Traits shared by event-recording aggregates and their events.

use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// A fact raised by an aggregate, named in the past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Name stored alongside the payload, e.g. `PromotionUsed`.
    fn event_type(&self) -> &'static str;
}

/// An entity whose changes are expressed as domain events.
///
/// Command methods take `&self` and return the events they would raise.
/// [`record`](Aggregate::record) applies those events, bumps the version and
/// keeps them pending until a publisher takes them.
pub trait Aggregate: Send + Sync + Sized {
    type Event: DomainEvent;
    type Error: std::error::Error + Send + Sync;

    /// Aggregate name stored in event envelopes.
    fn aggregate_type() -> &'static str;

    /// Stream identifier stored in event envelopes.
    fn aggregate_id(&self) -> String;

    /// Current version, pending events included.
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);

    /// Folds one event into the state. Must not fail or have side effects.
    fn apply(&mut self, event: Self::Event);

    /// Events recorded but not yet published.
    fn pending_events(&self) -> &[Self::Event];

    fn take_pending_events(&mut self) -> Vec<Self::Event>;

    /// Queues an event that has already been applied.
    fn push_pending_event(&mut self, event: Self::Event);

    /// Applies new events and queues them for publication.
    fn record(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event.clone());
            self.set_version(self.version().next());
            self.push_pending_event(event);
        }
    }

    /// Replays historical events; nothing is queued.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
            self.set_version(self.version().next());
        }
    }

    /// Version the aggregate was loaded at, i.e. before its pending events.
    fn committed_version(&self) -> Version {
        self.version().rewind(self.pending_events().len())
    }
}
