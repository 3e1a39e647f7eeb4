//! Schedule lifecycle: listing, cancel/delete with typed state violations,
//! and the periodic overdue sweep.

use chrono::NaiveDate;
use upkeep_core::error::CoreError;
use upkeep_core::status::{state_machine, Priority, ScheduleStatus};
use upkeep_core::types::DbId;
use upkeep_db::models::schedule::{PmSchedule, ScheduleFilter};
use upkeep_db::Store;

use crate::{PmError, PmResult};

/// Fetch one schedule.
pub async fn get_schedule(store: &Store, id: DbId) -> PmResult<PmSchedule> {
    store
        .schedules
        .find_by_id(id)
        .await?
        .ok_or(PmError::Core(CoreError::NotFound {
            entity: "schedule",
            id,
        }))
}

/// List schedules after validating filter enum fields.
pub async fn list_schedules(store: &Store, filter: &ScheduleFilter) -> PmResult<Vec<PmSchedule>> {
    if let Some(status) = &filter.status {
        ScheduleStatus::parse(status)?;
    }
    if let Some(priority) = &filter.priority {
        Priority::parse(priority)?;
    }
    Ok(store.schedules.list(filter).await?)
}

/// Cancel a schedule. Operator-initiated; only `scheduled` and `overdue`
/// schedules can be cancelled.
pub async fn cancel_schedule(store: &Store, id: DbId) -> PmResult<PmSchedule> {
    let cancellable = state_machine::transition_sources(ScheduleStatus::Cancelled);
    let updated = store
        .schedules
        .transition_if(id, &cancellable, ScheduleStatus::Cancelled)
        .await?;
    match updated {
        Some(schedule) => {
            tracing::info!(schedule_id = id, "PM schedule cancelled");
            Ok(schedule)
        }
        // Lost the conditional update: distinguish missing from a state
        // violation using the current row.
        None => {
            let current = get_schedule(store, id).await?;
            Err(PmError::Core(CoreError::NotCancellable {
                id,
                status: current.status()?,
            }))
        }
    }
}

/// Delete a schedule. Only `scheduled` schedules are deletable; anything
/// that has been started, finished, or already resolved stays on record.
pub async fn delete_schedule(store: &Store, id: DbId) -> PmResult<()> {
    let deleted = store
        .schedules
        .delete_if(id, &[ScheduleStatus::Scheduled])
        .await?;
    if deleted {
        tracing::info!(schedule_id = id, "PM schedule deleted");
        return Ok(());
    }
    let current = get_schedule(store, id).await?;
    Err(PmError::Core(CoreError::NotDeletable {
        id,
        status: current.status()?,
    }))
}

/// The overdue sweep: promote every `scheduled` schedule dated strictly
/// before `today` to `overdue`.
///
/// Idempotent, and safe to interleave with user-driven transitions: the
/// store applies it as a conditional update, so a schedule started
/// concurrently keeps its `in_progress` status.
pub async fn run_overdue_sweep(store: &Store, today: NaiveDate) -> PmResult<u64> {
    let promoted = store.schedules.mark_overdue_before(today).await?;
    if promoted > 0 {
        tracing::info!(promoted, %today, "Overdue sweep promoted schedules");
    } else {
        tracing::debug!(%today, "Overdue sweep found nothing to promote");
    }
    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use upkeep_db::models::schedule::CreatePmSchedule;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn seed_schedule(store: &Store, equipment_id: DbId, date: NaiveDate) -> PmSchedule {
        store
            .schedules
            .create(&CreatePmSchedule {
                template_id: 1,
                equipment_id,
                scheduled_date: date,
                technician_id: None,
                priority: "medium".into(),
            })
            .await
            .unwrap()
    }

    async fn start(store: &Store, schedule_id: DbId) {
        store
            .executions
            .start(schedule_id, 1, Utc::now(), vec![])
            .await
            .unwrap()
            .unwrap();
    }

    // -- Overdue sweep --------------------------------------------------------

    #[tokio::test]
    async fn sweep_promotes_only_past_scheduled() {
        let store = Store::memory();
        let past = seed_schedule(&store, 1, d(2024, 2, 1)).await;
        let today_row = seed_schedule(&store, 2, d(2024, 3, 1)).await;
        let future = seed_schedule(&store, 3, d(2024, 4, 1)).await;

        let promoted = run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap();
        assert_eq!(promoted, 1);

        assert_eq!(get_schedule(&store, past.id).await.unwrap().status, "overdue");
        // Due today is not yet overdue.
        assert_eq!(
            get_schedule(&store, today_row.id).await.unwrap().status,
            "scheduled"
        );
        assert_eq!(
            get_schedule(&store, future.id).await.unwrap().status,
            "scheduled"
        );
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let store = Store::memory();
        let past = seed_schedule(&store, 1, d(2024, 2, 1)).await;

        assert_eq!(run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap(), 1);
        // Second run with no intervening mutation changes nothing.
        assert_eq!(run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap(), 0);
        assert_eq!(get_schedule(&store, past.id).await.unwrap().status, "overdue");
    }

    #[tokio::test]
    async fn sweep_never_touches_started_schedules() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 2, 1)).await;
        start(&store, schedule.id).await;

        let promoted = run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap();
        assert_eq!(promoted, 0);
        assert_eq!(
            get_schedule(&store, schedule.id).await.unwrap().status,
            "in_progress"
        );
    }

    // -- Cancel ---------------------------------------------------------------

    #[tokio::test]
    async fn cancel_scheduled_and_overdue() {
        let store = Store::memory();
        let scheduled = seed_schedule(&store, 1, d(2024, 4, 1)).await;
        let overdue = seed_schedule(&store, 2, d(2024, 1, 1)).await;
        run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap();

        assert_eq!(
            cancel_schedule(&store, scheduled.id).await.unwrap().status,
            "cancelled"
        );
        assert_eq!(
            cancel_schedule(&store, overdue.id).await.unwrap().status,
            "cancelled"
        );
    }

    #[tokio::test]
    async fn cancel_in_progress_rejected_with_status() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 4, 1)).await;
        start(&store, schedule.id).await;

        let err = cancel_schedule(&store, schedule.id).await.unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotCancellable {
                status: ScheduleStatus::InProgress,
                ..
            })
        );
    }

    #[tokio::test]
    async fn cancel_cancelled_rejected() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 4, 1)).await;
        cancel_schedule(&store, schedule.id).await.unwrap();

        let err = cancel_schedule(&store, schedule.id).await.unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotCancellable {
                status: ScheduleStatus::Cancelled,
                ..
            })
        );
    }

    #[tokio::test]
    async fn cancel_missing_schedule_is_not_found() {
        let store = Store::memory();
        let err = cancel_schedule(&store, 99).await.unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotFound {
                entity: "schedule",
                id: 99
            })
        );
    }

    // -- Delete ---------------------------------------------------------------

    #[tokio::test]
    async fn delete_scheduled_succeeds() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 4, 1)).await;
        delete_schedule(&store, schedule.id).await.unwrap();
        assert_matches!(
            get_schedule(&store, schedule.id).await.unwrap_err(),
            PmError::Core(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn delete_in_progress_rejected() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 4, 1)).await;
        start(&store, schedule.id).await;

        let err = delete_schedule(&store, schedule.id).await.unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotDeletable {
                status: ScheduleStatus::InProgress,
                ..
            })
        );
    }

    #[tokio::test]
    async fn delete_overdue_rejected() {
        let store = Store::memory();
        let schedule = seed_schedule(&store, 1, d(2024, 1, 1)).await;
        run_overdue_sweep(&store, d(2024, 3, 1)).await.unwrap();

        let err = delete_schedule(&store, schedule.id).await.unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotDeletable {
                status: ScheduleStatus::Overdue,
                ..
            })
        );
    }

    // -- Listing --------------------------------------------------------------

    #[tokio::test]
    async fn list_rejects_unknown_status_filter() {
        let store = Store::memory();
        let filter = ScheduleFilter {
            status: Some("paused".into()),
            ..Default::default()
        };
        assert_matches!(
            list_schedules(&store, &filter).await.unwrap_err(),
            PmError::Core(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn list_filters_are_conjunctive() {
        let store = Store::memory();
        seed_schedule(&store, 1, d(2024, 3, 1)).await;
        seed_schedule(&store, 1, d(2024, 4, 1)).await;
        seed_schedule(&store, 2, d(2024, 3, 1)).await;

        let filter = ScheduleFilter {
            equipment_id: Some(1),
            date_from: Some(d(2024, 3, 15)),
            ..Default::default()
        };
        let rows = list_schedules(&store, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scheduled_date, d(2024, 4, 1));
    }
}
