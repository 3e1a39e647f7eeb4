//! Maintenance event bus.
//!
//! The notification evaluator publishes [`MaintenanceEvent`]s here; whatever
//! delivers them (push, email, a websocket relay) subscribes independently.
//! Emission is decoupled from delivery — the engine's at-most-once guarantee
//! lives in the schedule flags, not in this bus.

pub mod bus;

pub use bus::{EventBus, MaintenanceEvent};
