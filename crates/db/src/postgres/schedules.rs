//! Schedule queries against the `pm_schedules` table.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use upkeep_core::compliance::StatusCounts;
use upkeep_core::notifications::NotificationThreshold;
use upkeep_core::status::ScheduleStatus;
use upkeep_core::types::DbId;

use crate::models::schedule::{CreatePmSchedule, PmSchedule, ScheduleFilter};
use crate::store::{SchedulesRepository, StoreResult};

use super::{map_unique_violation, status_strings, PgStore};

/// Column list for `pm_schedules` queries.
const COLUMNS: &str = "\
    id, template_id, equipment_id, scheduled_date, technician_id, \
    status, priority, sent_3days, sent_1day, sent_today, \
    created_at, updated_at";

#[async_trait]
impl SchedulesRepository for PgStore {
    async fn create(&self, input: &CreatePmSchedule) -> StoreResult<PmSchedule> {
        let query = format!(
            "INSERT INTO pm_schedules \
                 (template_id, equipment_id, scheduled_date, technician_id, status, priority) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PmSchedule>(&query)
            .bind(input.template_id)
            .bind(input.equipment_id)
            .bind(input.scheduled_date)
            .bind(input.technician_id)
            .bind(ScheduleStatus::Scheduled.as_str())
            .bind(&input.priority)
            .fetch_one(self.pool())
            .await
            .map_err(map_unique_violation)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmSchedule>> {
        let query = format!("SELECT {COLUMNS} FROM pm_schedules WHERE id = $1");
        let schedule = sqlx::query_as::<_, PmSchedule>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(schedule)
    }

    async fn list(&self, filter: &ScheduleFilter) -> StoreResult<Vec<PmSchedule>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM pm_schedules WHERE 1 = 1"));

        if let Some(equipment_id) = filter.equipment_id {
            builder.push(" AND equipment_id = ").push_bind(equipment_id);
        }
        if let Some(type_id) = filter.equipment_type_id {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM equipment \
                     WHERE equipment.id = pm_schedules.equipment_id \
                     AND equipment.equipment_type_id = ",
                )
                .push_bind(type_id)
                .push(")");
        }
        if let Some(technician_id) = filter.technician_id {
            builder
                .push(" AND technician_id = ")
                .push_bind(technician_id);
        }
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = &filter.priority {
            builder.push(" AND priority = ").push_bind(priority);
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND scheduled_date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND scheduled_date <= ").push_bind(to);
        }

        builder
            .push(" ORDER BY scheduled_date, id LIMIT ")
            .push_bind(filter.effective_limit())
            .push(" OFFSET ")
            .push_bind(filter.effective_offset());

        let schedules = builder
            .build_query_as::<PmSchedule>()
            .fetch_all(self.pool())
            .await?;
        Ok(schedules)
    }

    async fn occurrence_exists(
        &self,
        equipment_id: DbId,
        template_id: DbId,
        scheduled_date: NaiveDate,
    ) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM pm_schedules \
                 WHERE equipment_id = $1 AND template_id = $2 AND scheduled_date = $3 \
             )",
        )
        .bind(equipment_id)
        .bind(template_id)
        .bind(scheduled_date)
        .fetch_one(self.pool())
        .await?;
        Ok(exists)
    }

    async fn count_for_template(&self, template_id: DbId) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pm_schedules WHERE template_id = $1")
                .bind(template_id)
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }

    async fn transition_if(
        &self,
        id: DbId,
        allowed_from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> StoreResult<Option<PmSchedule>> {
        let query = format!(
            "UPDATE pm_schedules \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, PmSchedule>(&query)
            .bind(id)
            .bind(to.as_str())
            .bind(status_strings(allowed_from))
            .fetch_optional(self.pool())
            .await?;
        Ok(schedule)
    }

    async fn delete_if(&self, id: DbId, allowed_from: &[ScheduleStatus]) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM pm_schedules WHERE id = $1 AND status = ANY($2)")
            .bind(id)
            .bind(status_strings(allowed_from))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_overdue_before(&self, today: NaiveDate) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE pm_schedules \
             SET status = $1, updated_at = NOW() \
             WHERE status = $2 AND scheduled_date < $3",
        )
        .bind(ScheduleStatus::Overdue.as_str())
        .bind(ScheduleStatus::Scheduled.as_str())
        .bind(today)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn mark_notified(
        &self,
        id: DbId,
        threshold: NotificationThreshold,
    ) -> StoreResult<bool> {
        let column = match threshold {
            NotificationThreshold::ThreeDay => "sent_3days",
            NotificationThreshold::OneDay => "sent_1day",
            NotificationThreshold::SameDay => "sent_today",
        };
        let query = format!(
            "UPDATE pm_schedules \
             SET {column} = TRUE, updated_at = NOW() \
             WHERE id = $1 AND {column} = FALSE AND status = $2"
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(ScheduleStatus::Scheduled.as_str())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_scheduled_on(&self, date: NaiveDate) -> StoreResult<Vec<PmSchedule>> {
        let query = format!(
            "SELECT {COLUMNS} FROM pm_schedules \
             WHERE status = $1 AND scheduled_date = $2 \
             ORDER BY id"
        );
        let schedules = sqlx::query_as::<_, PmSchedule>(&query)
            .bind(ScheduleStatus::Scheduled.as_str())
            .bind(date)
            .fetch_all(self.pool())
            .await?;
        Ok(schedules)
    }

    async fn status_counts(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> StoreResult<StatusCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM pm_schedules \
             WHERE ($1::DATE IS NULL OR scheduled_date >= $1) \
               AND ($2::DATE IS NULL OR scheduled_date <= $2) \
             GROUP BY status",
        )
        .bind(date_from)
        .bind(date_to)
        .fetch_all(self.pool())
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            if let Ok(status) = ScheduleStatus::parse(&status) {
                match status {
                    ScheduleStatus::Scheduled => counts.scheduled = count,
                    ScheduleStatus::InProgress => counts.in_progress = count,
                    ScheduleStatus::Completed => counts.completed = count,
                    ScheduleStatus::Overdue => counts.overdue = count,
                    ScheduleStatus::Cancelled => counts.cancelled = count,
                }
            }
        }
        Ok(counts)
    }
}
