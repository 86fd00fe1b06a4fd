use chrono::{DateTime, Utc};

/// A notification published on the bus.
///
/// Events are immutable facts: once published they are never edited, only
/// superseded by later events. The stable name and schema version let
/// downstream consumers dispatch and evolve independently of this crate.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted event name (e.g. "stock.alert.raised").
    fn event_type(&self) -> &'static str;

    /// Schema version of this event type.
    fn version(&self) -> u32;

    /// Business time at which the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
