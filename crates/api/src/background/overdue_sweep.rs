//! Periodic overdue promotion.
//!
//! Spawns a loop that promotes every `scheduled` schedule whose date has
//! passed to `overdue`. Runs on a fixed interval using
//! `tokio::time::interval`; the sweep is idempotent and conditional, so
//! overlapping with user-driven transitions is safe.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use upkeep_db::Store;
use uuid::Uuid;

/// Run the overdue sweep loop until `cancel` is triggered.
pub async fn run(store: Store, interval_secs: u64, cancel: CancellationToken) {
    tracing::info!(interval_secs, "Overdue sweep task started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweep task stopping");
                break;
            }
            _ = interval.tick() => {
                let run_id = Uuid::new_v4();
                let today = Utc::now().date_naive();
                match upkeep_pm::lifecycle::run_overdue_sweep(&store, today).await {
                    Ok(promoted) => {
                        if promoted > 0 {
                            tracing::info!(%run_id, promoted, "Overdue sweep: promoted schedules");
                        } else {
                            tracing::debug!(%run_id, "Overdue sweep: nothing to promote");
                        }
                    }
                    Err(e) => {
                        tracing::error!(%run_id, error = %e, "Overdue sweep failed");
                    }
                }
            }
        }
    }
}
