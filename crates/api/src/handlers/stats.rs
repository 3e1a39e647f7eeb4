//! Handlers for dashboard and compliance statistics.
//!
//! "Today" is the UTC calendar day throughout.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use upkeep_pm::compliance;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of periods for compliance stats.
const DEFAULT_PERIODS: i32 = 6;

/// Query parameters for compliance stats.
#[derive(Debug, Deserialize)]
pub struct ComplianceParams {
    /// Number of calendar months to report, newest first. Defaults to 6.
    pub periods: Option<i32>,
}

/// GET /pm/stats/dashboard
pub async fn dashboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let stats = compliance::dashboard_stats(&state.store, today).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /pm/stats/compliance
pub async fn compliance_stats(
    State(state): State<AppState>,
    Query(params): Query<ComplianceParams>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let periods = params.periods.unwrap_or(DEFAULT_PERIODS);
    let stats = compliance::compliance_stats(&state.store, periods, today).await?;
    Ok(Json(DataResponse { data: stats }))
}
