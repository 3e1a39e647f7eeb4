use crate::status::ScheduleStatus;
use crate::types::DbId;

/// Domain error taxonomy for the maintenance engine.
///
/// Every invalid transition or failed precondition surfaces as its own
/// variant so callers can react to the specific condition instead of a
/// generic boolean. State-violation variants carry the current status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    #[error("Schedule {id} is already in progress")]
    AlreadyInProgress { id: DbId },

    #[error("Schedule {id} is already completed")]
    AlreadyCompleted { id: DbId },

    #[error("Schedule {id} cannot be cancelled while {status}")]
    NotCancellable { id: DbId, status: ScheduleStatus },

    #[error("Schedule {id} cannot be deleted while {status}")]
    NotDeletable { id: DbId, status: ScheduleStatus },

    #[error("Schedule {schedule_id} already has an execution")]
    ExecutionExists { schedule_id: DbId },

    #[error("Required checklist items not checked: {}", format_ids(missing))]
    RequiredItemsIncomplete { missing: Vec<DbId> },

    #[error("Template {id} is referenced by {schedule_count} schedule(s)")]
    TemplateInUse { id: DbId, schedule_count: i64 },
}

fn format_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
