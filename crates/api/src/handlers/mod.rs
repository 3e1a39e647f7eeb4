//! Request handlers for the PM engine surface.
//!
//! Each submodule provides async handler functions for one resource group.
//! Handlers delegate to `upkeep_pm` (mutations, domain rules) or to the
//! store directly (plain reads) and map errors via
//! [`crate::error::AppError`].

pub mod executions;
pub mod schedules;
pub mod stats;
pub mod sweeps;
pub mod templates;
