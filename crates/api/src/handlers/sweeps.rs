//! Manual triggers for the periodic sweeps.
//!
//! The same sweeps run in-process on timers ([`crate::background`]); these
//! endpoints let an operator or an external scheduler force a run.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use upkeep_pm::{lifecycle, notify};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of a manual overdue sweep.
#[derive(Debug, Serialize)]
pub struct OverdueSweepResponse {
    pub promoted: u64,
}

/// POST /pm/sweeps/overdue
pub async fn run_overdue_sweep(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let promoted = lifecycle::run_overdue_sweep(&state.store, today).await?;
    Ok(Json(DataResponse {
        data: OverdueSweepResponse { promoted },
    }))
}

/// POST /pm/sweeps/notifications
pub async fn run_notification_sweep(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let run = notify::run_notification_sweep(&state.store, &state.events, today).await?;
    Ok(Json(DataResponse { data: run }))
}
