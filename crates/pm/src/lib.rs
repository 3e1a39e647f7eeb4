//! The preventive-maintenance engine.
//!
//! Stateless operations over an injected [`upkeep_db::Store`]:
//!
//! - [`registry`] — template CRUD with recurrence/checklist validation and
//!   the referential delete guard.
//! - [`generator`] — expands a template's recurrence rule into dated
//!   schedule instances, idempotently.
//! - [`lifecycle`] — cancel/delete with typed state violations, listing,
//!   and the periodic overdue sweep.
//! - [`execution`] — start/update/complete technician work, atomically
//!   paired with the owning schedule's transitions.
//! - [`notify`] — day-offset reminder evaluation with at-most-once emission
//!   per threshold.
//! - [`compliance`] — period compliance rates and dashboard counters.
//!
//! All shared mutable state lives in the store; every function here is a
//! transformation over data fetched at call time.

pub mod compliance;
pub mod execution;
pub mod generator;
pub mod lifecycle;
pub mod notify;
pub mod registry;

use upkeep_core::error::CoreError;
use upkeep_db::StoreError;

/// Engine error: a typed domain failure or a storage failure.
#[derive(Debug, thiserror::Error)]
pub enum PmError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PmResult<T> = Result<T, PmError>;
