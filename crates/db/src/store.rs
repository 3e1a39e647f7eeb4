//! Repository traits and the [`Store`] aggregate.
//!
//! Every component talks to these traits; the backend behind them is either
//! PostgreSQL ([`crate::postgres`]) or the in-memory mock
//! ([`crate::memory`]). Each trait method that mutates schedule status is a
//! conditional operation so concurrent callers cannot clobber each other:
//! the backend applies the change only if the row is still in one of the
//! expected states and reports whether it won.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use upkeep_core::notifications::NotificationThreshold;
use upkeep_core::status::ScheduleStatus;
use upkeep_core::types::{DbId, Timestamp};

use crate::models::equipment::{CreateEquipment, Equipment};
use crate::models::execution::{ExecutionFinal, PmExecution, UpdatePmExecution};
use crate::models::schedule::{CreatePmSchedule, PmSchedule, ScheduleFilter};
use crate::models::technician::{CreateTechnician, Technician};
use crate::models::template::{CreatePmTemplate, PmTemplate, UpdatePmTemplate};

/// Storage-layer error. Domain rules live above this; the store only
/// reports infrastructure failures and key conflicts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// CRUD over PM templates.
#[async_trait]
pub trait TemplatesRepository: Send + Sync {
    async fn create(&self, input: &CreatePmTemplate) -> StoreResult<PmTemplate>;

    /// Returns `None` if the template does not exist.
    async fn update(&self, id: DbId, input: &UpdatePmTemplate)
        -> StoreResult<Option<PmTemplate>>;

    /// Returns `true` if a row was deleted. Referential guarding happens in
    /// the engine before this is called.
    async fn delete(&self, id: DbId) -> StoreResult<bool>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmTemplate>>;

    async fn list(&self, active_only: bool) -> StoreResult<Vec<PmTemplate>>;
}

/// The authoritative collection of schedule instances.
#[async_trait]
pub trait SchedulesRepository: Send + Sync {
    /// Insert a new `scheduled` row with all notification flags false.
    /// Fails with [`StoreError::Conflict`] if the occurrence key exists.
    async fn create(&self, input: &CreatePmSchedule) -> StoreResult<PmSchedule>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmSchedule>>;

    async fn list(&self, filter: &ScheduleFilter) -> StoreResult<Vec<PmSchedule>>;

    /// Whether a schedule already exists for the occurrence key.
    async fn occurrence_exists(
        &self,
        equipment_id: DbId,
        template_id: DbId,
        scheduled_date: NaiveDate,
    ) -> StoreResult<bool>;

    /// Number of schedules referencing a template (any status).
    async fn count_for_template(&self, template_id: DbId) -> StoreResult<i64>;

    /// Conditionally transition: apply `to` only if the current status is in
    /// `allowed_from`. Returns the updated row, or `None` if the row is
    /// missing or its status changed under us.
    async fn transition_if(
        &self,
        id: DbId,
        allowed_from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> StoreResult<Option<PmSchedule>>;

    /// Delete only if the current status is in `allowed_from`. Returns
    /// whether a row was deleted.
    async fn delete_if(&self, id: DbId, allowed_from: &[ScheduleStatus]) -> StoreResult<bool>;

    /// The overdue sweep: every `scheduled` row dated strictly before
    /// `today` becomes `overdue`. Conditional on status, so a concurrent
    /// start is never clobbered. Returns the number of rows promoted.
    async fn mark_overdue_before(&self, today: NaiveDate) -> StoreResult<u64>;

    /// Flip one notification flag false -> true, only while the schedule is
    /// still `scheduled`. Returns `true` if this call flipped it — the
    /// caller that sees `true` owns the single emission for the threshold.
    async fn mark_notified(
        &self,
        id: DbId,
        threshold: NotificationThreshold,
    ) -> StoreResult<bool>;

    /// All `scheduled` rows dated exactly `date` (no paging; the
    /// notification evaluator must see every candidate).
    async fn list_scheduled_on(&self, date: NaiveDate) -> StoreResult<Vec<PmSchedule>>;

    /// Per-status counts over `scheduled_date`, optionally bounded on either
    /// side (inclusive).
    async fn status_counts(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> StoreResult<upkeep_core::compliance::StatusCounts>;
}

/// Execution records and the two compound schedule+execution operations.
#[async_trait]
pub trait ExecutionsRepository: Send + Sync {
    /// Atomically claim the schedule (`scheduled`/`overdue` ->
    /// `in_progress`, technician assigned sticky) and create its execution.
    ///
    /// Returns `None` if the claim lost (schedule missing or not in a
    /// startable status). Fails with [`StoreError::Conflict`] if an
    /// execution already exists for the schedule.
    async fn start(
        &self,
        schedule_id: DbId,
        technician_id: DbId,
        started_at: Timestamp,
        seeded_results: Vec<upkeep_core::checklist::ChecklistResult>,
    ) -> StoreResult<Option<(PmSchedule, PmExecution)>>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmExecution>>;

    async fn find_by_schedule(&self, schedule_id: DbId) -> StoreResult<Option<PmExecution>>;

    /// Apply a progress save, only while the execution is `in_progress`.
    /// Returns `None` if the execution is missing or already completed.
    async fn update_in_progress(
        &self,
        id: DbId,
        input: &UpdatePmExecution,
    ) -> StoreResult<Option<PmExecution>>;

    /// Atomically finalize the execution and complete the owning schedule.
    /// Returns `None` if the execution is missing or not `in_progress`.
    async fn complete(
        &self,
        id: DbId,
        fin: &ExecutionFinal,
    ) -> StoreResult<Option<(PmExecution, PmSchedule)>>;
}

/// Lookup over equipment (owned by the wider dashboard).
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn create(&self, input: &CreateEquipment) -> StoreResult<Equipment>;
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Equipment>>;
    async fn list(&self) -> StoreResult<Vec<Equipment>>;
}

/// Lookup over technicians (owned by the wider dashboard).
#[async_trait]
pub trait TechniciansRepository: Send + Sync {
    async fn create(&self, input: &CreateTechnician) -> StoreResult<Technician>;
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Technician>>;
    async fn list(&self) -> StoreResult<Vec<Technician>>;
}

// ---------------------------------------------------------------------------
// Store aggregate
// ---------------------------------------------------------------------------

/// Bundle of repositories handed to the engine and the API.
///
/// Cheaply cloneable; all fields are `Arc`s over one shared backend.
#[derive(Clone)]
pub struct Store {
    pub templates: Arc<dyn TemplatesRepository>,
    pub schedules: Arc<dyn SchedulesRepository>,
    pub executions: Arc<dyn ExecutionsRepository>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub technicians: Arc<dyn TechniciansRepository>,
}

impl Store {
    /// Store backed by PostgreSQL.
    pub fn postgres(pool: crate::DbPool) -> Self {
        let backend = Arc::new(crate::postgres::PgStore::new(pool));
        Self {
            templates: backend.clone(),
            schedules: backend.clone(),
            executions: backend.clone(),
            equipment: backend.clone(),
            technicians: backend,
        }
    }

    /// Store backed by the in-memory mock. Starts empty.
    pub fn memory() -> Self {
        let backend = Arc::new(crate::memory::MemoryStore::new());
        Self {
            templates: backend.clone(),
            schedules: backend.clone(),
            executions: backend.clone(),
            equipment: backend.clone(),
            technicians: backend,
        }
    }
}
