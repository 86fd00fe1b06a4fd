//! `salonstock-events` — event trait and pub/sub transport.
//!
//! Stock alerts and similar notifications flow out of the core through the
//! [`EventBus`] abstraction; consumers (dashboards, notification workers)
//! subscribe and receive their own copy of every published event.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
