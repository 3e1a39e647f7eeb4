//! Notification trigger evaluator.
//!
//! Scans `scheduled` schedules for the day-offset thresholds and emits one
//! event per (schedule, threshold) at most, ever. The winner of the
//! conditional flag flip owns the emission, so repeated or racing sweeps
//! never double-send. Delivery is whatever subscribes to the bus.

use chrono::NaiveDate;
use serde::Serialize;
use upkeep_core::notifications::{NotificationThreshold, ALL_THRESHOLDS};
use upkeep_core::types::DbId;
use upkeep_db::Store;
use upkeep_events::{EventBus, MaintenanceEvent};

use crate::PmResult;

/// One reminder emitted during a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct NotifiedSchedule {
    pub schedule_id: DbId,
    pub equipment_id: DbId,
    pub scheduled_date: NaiveDate,
    pub event_type: &'static str,
}

/// Outcome of one notification sweep.
#[derive(Debug, Serialize)]
pub struct NotificationRun {
    pub count: usize,
    pub notified: Vec<NotifiedSchedule>,
}

/// Evaluate all thresholds against `today`, flip the winning flags, and
/// publish one event per winner.
pub async fn run_notification_sweep(
    store: &Store,
    bus: &EventBus,
    today: NaiveDate,
) -> PmResult<NotificationRun> {
    let mut notified = Vec::new();

    for threshold in ALL_THRESHOLDS {
        let target = threshold.target_date(today);
        let candidates = store.schedules.list_scheduled_on(target).await?;

        for schedule in candidates {
            if already_sent(&schedule, threshold) {
                continue;
            }
            // The conditional flip decides who emits; losers skip silently.
            let won = store.schedules.mark_notified(schedule.id, threshold).await?;
            if !won {
                continue;
            }

            bus.publish(
                MaintenanceEvent::new(threshold.event_type())
                    .with_schedule(schedule.id, schedule.equipment_id)
                    .with_payload(serde_json::json!({
                        "scheduled_date": schedule.scheduled_date,
                        "technician_id": schedule.technician_id,
                        "priority": schedule.priority,
                    })),
            );
            notified.push(NotifiedSchedule {
                schedule_id: schedule.id,
                equipment_id: schedule.equipment_id,
                scheduled_date: schedule.scheduled_date,
                event_type: threshold.event_type(),
            });
        }
    }

    if notified.is_empty() {
        tracing::debug!(%today, "Notification sweep emitted nothing");
    } else {
        tracing::info!(%today, count = notified.len(), "Notification sweep emitted reminders");
    }
    Ok(NotificationRun {
        count: notified.len(),
        notified,
    })
}

fn already_sent(
    schedule: &upkeep_db::models::schedule::PmSchedule,
    threshold: NotificationThreshold,
) -> bool {
    match threshold {
        NotificationThreshold::ThreeDay => schedule.sent_3days,
        NotificationThreshold::OneDay => schedule.sent_1day,
        NotificationThreshold::SameDay => schedule.sent_today,
    }
}
