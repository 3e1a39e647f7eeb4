//! Pure domain layer for the preventive-maintenance engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the engine, the API, and any future CLI tooling alike.
//! It owns the typed error taxonomy, the schedule state machine, the
//! recurrence arithmetic, the checklist completion gate, notification
//! thresholds, and compliance arithmetic.

pub mod checklist;
pub mod compliance;
pub mod error;
pub mod notifications;
pub mod recurrence;
pub mod status;
pub mod types;
