//! Periodic notification threshold evaluation.
//!
//! Scans for schedules 3 days out, 1 day out, and due today, emitting each
//! reminder at most once (the schedule's monotonic sent-flags guarantee
//! this across restarts and overlapping runs).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use upkeep_db::Store;
use upkeep_events::EventBus;
use uuid::Uuid;

/// Run the notification sweep loop until `cancel` is triggered.
pub async fn run(store: Store, bus: Arc<EventBus>, interval_secs: u64, cancel: CancellationToken) {
    tracing::info!(interval_secs, "Notification sweep task started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Notification sweep task stopping");
                break;
            }
            _ = interval.tick() => {
                let run_id = Uuid::new_v4();
                let today = Utc::now().date_naive();
                match upkeep_pm::notify::run_notification_sweep(&store, &bus, today).await {
                    Ok(run) => {
                        if run.count > 0 {
                            tracing::info!(%run_id, count = run.count, "Notification sweep: reminders emitted");
                        } else {
                            tracing::debug!(%run_id, "Notification sweep: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(%run_id, error = %e, "Notification sweep failed");
                    }
                }
            }
        }
    }
}
