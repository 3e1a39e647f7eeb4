//! Execution queries against the `pm_executions` table.
//!
//! The schedule transitions for start and complete are written here, inside
//! one transaction with the execution row, so the pair is atomic.

use async_trait::async_trait;
use sqlx::types::Json;
use upkeep_core::checklist::ChecklistResult;
use upkeep_core::status::{state_machine, ExecutionStatus, ScheduleStatus};
use upkeep_core::types::{DbId, Timestamp};

use crate::models::execution::{ExecutionFinal, PmExecution, UpdatePmExecution};
use crate::models::schedule::PmSchedule;
use crate::store::{ExecutionsRepository, StoreResult};

use super::{map_unique_violation, status_strings, PgStore};

/// Column list for `pm_executions` queries.
const COLUMNS: &str = "\
    id, schedule_id, technician_id, status, started_at, completed_at, \
    checklist_results, used_parts, findings, findings_severity, \
    rating, notes, created_at, updated_at";

/// Column list for the schedule rows returned by the compound operations.
const SCHEDULE_COLUMNS: &str = "\
    id, template_id, equipment_id, scheduled_date, technician_id, \
    status, priority, sent_3days, sent_1day, sent_today, \
    created_at, updated_at";

#[async_trait]
impl ExecutionsRepository for PgStore {
    async fn start(
        &self,
        schedule_id: DbId,
        technician_id: DbId,
        started_at: Timestamp,
        seeded_results: Vec<ChecklistResult>,
    ) -> StoreResult<Option<(PmSchedule, PmExecution)>> {
        let mut tx = self.pool().begin().await?;

        // Claim the schedule: only a scheduled/overdue row can be started,
        // and a pre-assigned technician is kept (sticky assignment).
        let claim = format!(
            "UPDATE pm_schedules \
             SET status = $2, technician_id = COALESCE(technician_id, $3), updated_at = NOW() \
             WHERE id = $1 AND status = ANY($4) \
             RETURNING {SCHEDULE_COLUMNS}"
        );
        let startable = state_machine::transition_sources(ScheduleStatus::InProgress);
        let schedule = sqlx::query_as::<_, PmSchedule>(&claim)
            .bind(schedule_id)
            .bind(ScheduleStatus::InProgress.as_str())
            .bind(technician_id)
            .bind(status_strings(&startable))
            .fetch_optional(&mut *tx)
            .await?;

        let Some(schedule) = schedule else {
            // Claim lost; dropping the transaction rolls it back.
            return Ok(None);
        };
        let assignee = schedule.technician_id.unwrap_or(technician_id);

        let insert = format!(
            "INSERT INTO pm_executions \
                 (schedule_id, technician_id, status, started_at, checklist_results) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let execution = sqlx::query_as::<_, PmExecution>(&insert)
            .bind(schedule_id)
            .bind(assignee)
            .bind(ExecutionStatus::InProgress.as_str())
            .bind(started_at)
            .bind(Json(&seeded_results))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        tx.commit().await?;
        Ok(Some((schedule, execution)))
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmExecution>> {
        let query = format!("SELECT {COLUMNS} FROM pm_executions WHERE id = $1");
        let execution = sqlx::query_as::<_, PmExecution>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(execution)
    }

    async fn find_by_schedule(&self, schedule_id: DbId) -> StoreResult<Option<PmExecution>> {
        let query = format!("SELECT {COLUMNS} FROM pm_executions WHERE schedule_id = $1");
        let execution = sqlx::query_as::<_, PmExecution>(&query)
            .bind(schedule_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(execution)
    }

    async fn update_in_progress(
        &self,
        id: DbId,
        input: &UpdatePmExecution,
    ) -> StoreResult<Option<PmExecution>> {
        let query = format!(
            "UPDATE pm_executions SET \
                 checklist_results = COALESCE($2, checklist_results), \
                 used_parts = COALESCE($3, used_parts), \
                 findings = COALESCE($4, findings), \
                 findings_severity = COALESCE($5, findings_severity), \
                 notes = COALESCE($6, notes), \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $7 \
             RETURNING {COLUMNS}"
        );
        let execution = sqlx::query_as::<_, PmExecution>(&query)
            .bind(id)
            .bind(input.checklist_results.as_ref().map(Json))
            .bind(input.used_parts.as_ref().map(Json))
            .bind(&input.findings)
            .bind(&input.findings_severity)
            .bind(&input.notes)
            .bind(ExecutionStatus::InProgress.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(execution)
    }

    async fn complete(
        &self,
        id: DbId,
        fin: &ExecutionFinal,
    ) -> StoreResult<Option<(PmExecution, PmSchedule)>> {
        let mut tx = self.pool().begin().await?;

        let finalize = format!(
            "UPDATE pm_executions SET \
                 status = $2, \
                 checklist_results = $3, \
                 used_parts = $4, \
                 findings = $5, \
                 findings_severity = $6, \
                 rating = $7, \
                 notes = $8, \
                 completed_at = $9, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $10 \
             RETURNING {COLUMNS}"
        );
        let execution = sqlx::query_as::<_, PmExecution>(&finalize)
            .bind(id)
            .bind(ExecutionStatus::Completed.as_str())
            .bind(Json(&fin.checklist_results))
            .bind(Json(&fin.used_parts))
            .bind(&fin.findings)
            .bind(&fin.findings_severity)
            .bind(fin.rating)
            .bind(&fin.notes)
            .bind(fin.completed_at)
            .bind(ExecutionStatus::InProgress.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(execution) = execution else {
            return Ok(None);
        };

        let close = format!(
            "UPDATE pm_schedules \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SCHEDULE_COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, PmSchedule>(&close)
            .bind(execution.schedule_id)
            .bind(ScheduleStatus::Completed.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((execution, schedule)))
    }
}
