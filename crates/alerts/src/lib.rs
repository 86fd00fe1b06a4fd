//! `salonstock-alerts` — stock alert events and the emitter that dedupes them.

pub mod alert;
pub mod emitter;

pub use alert::StockAlert;
pub use emitter::AlertEmitter;
