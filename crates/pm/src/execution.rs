//! Execution tracker: start, update, and complete technician work against a
//! schedule.
//!
//! Starting claims the schedule and creates the execution as one atomic
//! store operation; completing finalizes the execution and the owning
//! schedule the same way. The engine validates preconditions first so every
//! failure is a typed error, and the store's conditional operations close
//! the race windows.

use upkeep_core::checklist::{missing_required_items, seed_results, validate_rating};
use upkeep_core::error::CoreError;
use upkeep_core::status::{FindingsSeverity, ScheduleStatus};
use upkeep_core::types::{DbId, Timestamp};
use upkeep_db::models::execution::{
    CompletePmExecution, ExecutionFinal, PmExecution, UpdatePmExecution,
};
use upkeep_db::models::schedule::PmSchedule;
use upkeep_db::{Store, StoreError};

use crate::{PmError, PmResult};

/// Fetch one execution.
pub async fn get_execution(store: &Store, id: DbId) -> PmResult<PmExecution> {
    store
        .executions
        .find_by_id(id)
        .await?
        .ok_or(PmError::Core(CoreError::NotFound {
            entity: "execution",
            id,
        }))
}

/// Start work on a schedule.
///
/// Requires the schedule to be `scheduled` or `overdue`. The schedule's
/// pre-assigned technician wins over the caller; whoever starts it is then
/// recorded on the schedule (sticky assignment). Checklist results are
/// seeded one-per-template-item, unchecked.
pub async fn start_execution(
    store: &Store,
    schedule_id: DbId,
    technician_id: DbId,
    now: Timestamp,
) -> PmResult<(PmSchedule, PmExecution)> {
    store
        .technicians
        .find_by_id(technician_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "technician",
            id: technician_id,
        })?;

    let schedule = store
        .schedules
        .find_by_id(schedule_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id: schedule_id,
        })?;
    reject_unstartable(schedule_id, schedule.status()?)?;

    let template = store
        .templates
        .find_by_id(schedule.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id: schedule.template_id,
        })?;
    let seeded = seed_results(&template.checklist_items);

    let started = store
        .executions
        .start(schedule_id, technician_id, now, seeded)
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => PmError::Core(CoreError::ExecutionExists { schedule_id }),
            other => PmError::Store(other),
        })?;

    match started {
        Some((schedule, execution)) => {
            tracing::info!(
                schedule_id,
                execution_id = execution.id,
                technician_id = execution.technician_id,
                "PM execution started"
            );
            Ok((schedule, execution))
        }
        // Lost the claim to a concurrent transition; report the fresh state.
        None => {
            let current = store
                .schedules
                .find_by_id(schedule_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "schedule",
                    id: schedule_id,
                })?;
            match reject_unstartable(schedule_id, current.status()?) {
                Err(err) => Err(err),
                // Startable again already; the caller can simply retry.
                Ok(()) => Err(PmError::Core(CoreError::AlreadyInProgress {
                    id: schedule_id,
                })),
            }
        }
    }
}

fn reject_unstartable(schedule_id: DbId, status: ScheduleStatus) -> PmResult<()> {
    match status {
        ScheduleStatus::Scheduled | ScheduleStatus::Overdue => Ok(()),
        ScheduleStatus::InProgress => {
            Err(PmError::Core(CoreError::AlreadyInProgress { id: schedule_id }))
        }
        ScheduleStatus::Completed => {
            Err(PmError::Core(CoreError::AlreadyCompleted { id: schedule_id }))
        }
        ScheduleStatus::Cancelled => Err(PmError::Core(CoreError::InvalidTransition {
            from: ScheduleStatus::Cancelled,
            to: ScheduleStatus::InProgress,
        })),
    }
}

/// Free-form progress save; allowed any number of times while in progress.
pub async fn update_execution(
    store: &Store,
    id: DbId,
    input: &UpdatePmExecution,
) -> PmResult<PmExecution> {
    if let Some(severity) = &input.findings_severity {
        FindingsSeverity::parse(severity)?;
    }

    let execution = get_execution(store, id).await?;
    let updated = store.executions.update_in_progress(id, input).await?;
    updated.ok_or(PmError::Core(CoreError::AlreadyCompleted {
        id: execution.schedule_id,
    }))
}

/// Complete an execution.
///
/// Every checklist item the template marks required must be checked in the
/// final results, or the call fails naming the missing items. On success
/// the execution and its schedule are finalized atomically; duration is
/// derived from the recorded timestamps.
pub async fn complete_execution(
    store: &Store,
    id: DbId,
    input: &CompletePmExecution,
    now: Timestamp,
) -> PmResult<(PmExecution, PmSchedule)> {
    if let Some(severity) = &input.findings_severity {
        FindingsSeverity::parse(severity)?;
    }
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let execution = get_execution(store, id).await?;
    if execution.status()? == upkeep_core::status::ExecutionStatus::Completed {
        return Err(PmError::Core(CoreError::AlreadyCompleted {
            id: execution.schedule_id,
        }));
    }

    let schedule = store
        .schedules
        .find_by_id(execution.schedule_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id: execution.schedule_id,
        })?;
    let template = store
        .templates
        .find_by_id(schedule.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id: schedule.template_id,
        })?;

    // Submitted fields fall back to what the technician already saved.
    let results = input
        .checklist_results
        .clone()
        .unwrap_or_else(|| execution.checklist_results.0.clone());

    let missing = missing_required_items(&template.checklist_items, &results);
    if !missing.is_empty() {
        return Err(PmError::Core(CoreError::RequiredItemsIncomplete { missing }));
    }

    let fin = ExecutionFinal {
        checklist_results: results,
        used_parts: input
            .used_parts
            .clone()
            .unwrap_or_else(|| execution.used_parts.0.clone()),
        findings: input.findings.clone().or_else(|| execution.findings.clone()),
        findings_severity: input
            .findings_severity
            .clone()
            .unwrap_or_else(|| execution.findings_severity.clone()),
        rating: input.rating.or(execution.rating),
        notes: input.notes.clone().or_else(|| execution.notes.clone()),
        completed_at: now,
    };

    let completed = store.executions.complete(id, &fin).await?;
    match completed {
        Some((execution, schedule)) => {
            tracing::info!(
                execution_id = execution.id,
                schedule_id = schedule.id,
                duration_minutes = execution.duration_minutes(),
                "PM execution completed"
            );
            Ok((execution, schedule))
        }
        None => Err(PmError::Core(CoreError::AlreadyCompleted {
            id: execution.schedule_id,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, NaiveDate, Utc};
    use upkeep_core::checklist::{ChecklistItem, ChecklistResult, UsedPart};
    use upkeep_db::models::equipment::CreateEquipment;
    use upkeep_db::models::schedule::CreatePmSchedule;
    use upkeep_db::models::technician::CreateTechnician;
    use upkeep_db::models::template::CreatePmTemplate;

    struct Fixture {
        store: Store,
        schedule_id: DbId,
        technician_id: DbId,
    }

    /// Template with 4 checklist items, 2 of them required (ids 1 and 2).
    async fn fixture() -> Fixture {
        let store = Store::memory();
        let template = store
            .templates
            .create(&CreatePmTemplate {
                name: "Quarterly inspection".into(),
                description: None,
                interval_type: "quarterly".into(),
                interval_value: 1,
                checklist_items: (1..=4)
                    .map(|id| ChecklistItem {
                        id,
                        order: id as i32,
                        description: format!("item {id}"),
                        is_required: id <= 2,
                    })
                    .collect(),
                required_parts: vec![],
                estimated_duration_minutes: Some(60),
                is_active: true,
            })
            .await
            .unwrap();
        let equipment = store
            .equipment
            .create(&CreateEquipment {
                name: "Forklift".into(),
                equipment_type_id: None,
                location: None,
            })
            .await
            .unwrap();
        let technician = store
            .technicians
            .create(&CreateTechnician {
                name: "Dana".into(),
                email: None,
            })
            .await
            .unwrap();
        let schedule = store
            .schedules
            .create(&CreatePmSchedule {
                template_id: template.id,
                equipment_id: equipment.id,
                scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                technician_id: None,
                priority: "medium".into(),
            })
            .await
            .unwrap();
        Fixture {
            store,
            schedule_id: schedule.id,
            technician_id: technician.id,
        }
    }

    fn checked(ids: &[DbId]) -> Vec<ChecklistResult> {
        (1..=4)
            .map(|id| ChecklistResult {
                item_id: id,
                is_checked: ids.contains(&id),
                has_issue: false,
            })
            .collect()
    }

    // -- Start ----------------------------------------------------------------

    #[tokio::test]
    async fn start_transitions_schedule_and_seeds_checklist() {
        let f = fixture().await;
        let (schedule, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();

        assert_eq!(schedule.status, "in_progress");
        assert_eq!(schedule.technician_id, Some(f.technician_id));
        assert_eq!(execution.status, "in_progress");
        assert_eq!(execution.checklist_results.0.len(), 4);
        assert!(execution.checklist_results.0.iter().all(|r| !r.is_checked));
        assert_eq!(execution.duration_minutes(), None);
    }

    #[tokio::test]
    async fn start_twice_is_already_in_progress() {
        let f = fixture().await;
        start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
            .await
            .unwrap();
        let err = start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
            .await
            .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::AlreadyInProgress { .. }));
    }

    #[tokio::test]
    async fn start_overdue_schedule_is_allowed() {
        let f = fixture().await;
        f.store
            .schedules
            .mark_overdue_before(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
            .await
            .unwrap();

        let (schedule, _) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        assert_eq!(schedule.status, "in_progress");
    }

    #[tokio::test]
    async fn start_cancelled_schedule_is_invalid_transition() {
        let f = fixture().await;
        f.store
            .schedules
            .transition_if(
                f.schedule_id,
                &[ScheduleStatus::Scheduled],
                ScheduleStatus::Cancelled,
            )
            .await
            .unwrap();

        let err = start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
            .await
            .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn start_unknown_technician_is_not_found() {
        let f = fixture().await;
        let err = start_execution(&f.store, f.schedule_id, 999, Utc::now())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotFound {
                entity: "technician",
                ..
            })
        );
    }

    // -- Update ---------------------------------------------------------------

    #[tokio::test]
    async fn update_saves_progress_repeatedly() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();

        let first = update_execution(
            &f.store,
            execution.id,
            &UpdatePmExecution {
                checklist_results: Some(checked(&[1])),
                findings: Some("Belt worn".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(first.findings.as_deref(), Some("Belt worn"));

        let second = update_execution(
            &f.store,
            execution.id,
            &UpdatePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                findings_severity: Some("minor".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(second.findings_severity, "minor");
        // Earlier findings survive a partial update.
        assert_eq!(second.findings.as_deref(), Some("Belt worn"));
    }

    #[tokio::test]
    async fn update_rejects_unknown_severity() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        let err = update_execution(
            &f.store,
            execution.id,
            &UpdatePmExecution {
                findings_severity: Some("catastrophic".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::Validation(_)));
    }

    // -- Complete -------------------------------------------------------------

    #[tokio::test]
    async fn complete_gate_names_missing_required_item_then_succeeds() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();

        // Only required item 1 checked; item 2 must be named.
        let err = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 3])),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::RequiredItemsIncomplete { ref missing }) if *missing == vec![2]
        );

        // Checking both required items and retrying succeeds.
        let (execution, schedule) = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                rating: Some(8),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(execution.status, "completed");
        assert_eq!(schedule.status, "completed");
        assert!(execution.completed_at.is_some());
        assert_eq!(execution.rating, Some(8));
    }

    #[tokio::test]
    async fn complete_uses_saved_results_when_none_submitted() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        update_execution(
            &f.store,
            execution.id,
            &UpdatePmExecution {
                checklist_results: Some(checked(&[1, 2, 3])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (execution, _) = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution::default(),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(execution.status, "completed");
    }

    #[tokio::test]
    async fn complete_twice_is_already_completed() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

        let err = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution::default(),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::AlreadyCompleted { .. }));
    }

    #[tokio::test]
    async fn update_after_complete_is_rejected() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

        let err = update_execution(&f.store, execution.id, &UpdatePmExecution::default())
            .await
            .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::AlreadyCompleted { .. }));
    }

    #[tokio::test]
    async fn complete_rejects_out_of_range_rating() {
        let f = fixture().await;
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, Utc::now())
                .await
                .unwrap();
        let err = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                rating: Some(11),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_matches!(err, PmError::Core(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn duration_derives_from_timestamps() {
        let f = fixture().await;
        let started = Utc::now() - Duration::minutes(90);
        let (_, execution) =
            start_execution(&f.store, f.schedule_id, f.technician_id, started)
                .await
                .unwrap();
        let (execution, _) = complete_execution(
            &f.store,
            execution.id,
            &CompletePmExecution {
                checklist_results: Some(checked(&[1, 2])),
                used_parts: Some(vec![UsedPart {
                    code: "FLT-7".into(),
                    name: "Filter".into(),
                    quantity: 1,
                }]),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(execution.duration_minutes(), Some(90));
        assert_eq!(execution.used_parts.0.len(), 1);
    }

    #[tokio::test]
    async fn complete_unknown_execution_is_not_found() {
        let store = Store::memory();
        let err = complete_execution(&store, 42, &CompletePmExecution::default(), Utc::now())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            PmError::Core(CoreError::NotFound {
                entity: "execution",
                id: 42
            })
        );
    }
}
