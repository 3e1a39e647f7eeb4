//! PM execution entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use upkeep_core::checklist::{ChecklistResult, UsedPart};
use upkeep_core::error::CoreError;
use upkeep_core::status::ExecutionStatus;
use upkeep_core::types::{DbId, Timestamp};

/// A row from the `pm_executions` table.
///
/// One row per schedule at most (`uq_pm_executions_schedule`). Duration is
/// derived from the two timestamps, never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PmExecution {
    pub id: DbId,
    pub schedule_id: DbId,
    pub technician_id: DbId,
    /// Raw status; parse via [`PmExecution::status`].
    pub status: String,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub checklist_results: Json<Vec<ChecklistResult>>,
    pub used_parts: Json<Vec<UsedPart>>,
    pub findings: Option<String>,
    pub findings_severity: String,
    pub rating: Option<i16>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PmExecution {
    /// Typed view of the raw status column.
    pub fn status(&self) -> Result<ExecutionStatus, CoreError> {
        ExecutionStatus::parse(&self.status)
    }

    /// Minutes between start and completion, rounded to the nearest minute.
    /// `None` while the execution is still in progress.
    pub fn duration_minutes(&self) -> Option<i64> {
        let completed = self.completed_at?;
        let secs = (completed - self.started_at).num_seconds();
        Some((secs as f64 / 60.0).round() as i64)
    }
}

/// DTO for a progress save on an in-progress execution. `None` fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePmExecution {
    pub checklist_results: Option<Vec<ChecklistResult>>,
    pub used_parts: Option<Vec<UsedPart>>,
    pub findings: Option<String>,
    pub findings_severity: Option<String>,
    pub notes: Option<String>,
}

/// DTO submitted when completing an execution. `None` fields fall back to
/// the values already saved on the execution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletePmExecution {
    pub checklist_results: Option<Vec<ChecklistResult>>,
    pub used_parts: Option<Vec<UsedPart>>,
    pub findings: Option<String>,
    pub findings_severity: Option<String>,
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

/// Fully-resolved final state written by the atomic complete operation.
///
/// Built by the engine after merging [`CompletePmExecution`] over the stored
/// execution and passing the required-items gate.
#[derive(Debug, Clone)]
pub struct ExecutionFinal {
    pub checklist_results: Vec<ChecklistResult>,
    pub used_parts: Vec<UsedPart>,
    pub findings: Option<String>,
    pub findings_severity: String,
    pub rating: Option<i16>,
    pub notes: Option<String>,
    pub completed_at: Timestamp,
}
