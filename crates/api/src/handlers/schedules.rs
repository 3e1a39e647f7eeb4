//! Handlers for PM schedule endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use upkeep_core::types::DbId;
use upkeep_db::models::schedule::{PmSchedule, ScheduleFilter};
use upkeep_pm::generator::{self, GenerateRequest};
use upkeep_pm::{execution, lifecycle};

use crate::error::AppResult;
use crate::handlers::executions::ExecutionPayload;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for starting work on a schedule.
#[derive(Debug, Deserialize)]
pub struct StartExecutionRequest {
    pub technician_id: DbId,
}

/// Response for a started schedule: the claimed schedule and its fresh
/// execution record.
#[derive(Debug, Serialize)]
pub struct StartExecutionResponse {
    pub schedule: PmSchedule,
    pub execution: ExecutionPayload,
}

/// POST /pm/schedules/generate
pub async fn generate_schedules(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let report = generator::generate(&state.store, &body).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /pm/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(filter): Query<ScheduleFilter>,
) -> AppResult<impl IntoResponse> {
    let schedules = lifecycle::list_schedules(&state.store, &filter).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// GET /pm/schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = lifecycle::get_schedule(&state.store, id).await?;
    Ok(Json(DataResponse { data: schedule }))
}

/// POST /pm/schedules/{id}/start
pub async fn start_execution(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<StartExecutionRequest>,
) -> AppResult<impl IntoResponse> {
    let (schedule, execution) =
        execution::start_execution(&state.store, id, body.technician_id, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartExecutionResponse {
                schedule,
                execution: ExecutionPayload::from(execution),
            },
        }),
    ))
}

/// POST /pm/schedules/{id}/cancel
pub async fn cancel_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = lifecycle::cancel_schedule(&state.store, id).await?;
    Ok(Json(DataResponse { data: schedule }))
}

/// DELETE /pm/schedules/{id}
///
/// Only `scheduled` schedules are deletable.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    lifecycle::delete_schedule(&state.store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
