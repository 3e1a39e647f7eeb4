//! Entity models and DTOs.
//!
//! Row structs mirror table columns exactly; status-like columns hold the
//! raw TEXT representation and `upkeep_core` owns parsing and validation.

pub mod equipment;
pub mod execution;
pub mod schedule;
pub mod technician;
pub mod template;
