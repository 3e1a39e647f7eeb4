//! PostgreSQL backend.
//!
//! One implementation struct covers all repository traits. Queries are
//! runtime strings over column-list constants; every status transition is a
//! conditional UPDATE (`WHERE status = ANY(…)`) so concurrent writers cannot
//! clobber each other, and the compound start/complete operations run in a
//! transaction.

mod directory;
mod executions;
mod schedules;
mod templates;

use crate::store::StoreError;
use crate::DbPool;

/// PostgreSQL-backed store.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a unique-constraint violation (PostgreSQL error 23505 on a `uq_`
/// constraint) to [`StoreError::Conflict`]; pass everything else through.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    StoreError::Database(err)
}

/// Bind helper: the TEXT[] form of a status slice.
pub(crate) fn status_strings(statuses: &[upkeep_core::status::ScheduleStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}
