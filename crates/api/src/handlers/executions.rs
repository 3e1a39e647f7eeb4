//! Handlers for PM execution endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use upkeep_core::types::DbId;
use upkeep_db::models::execution::{CompletePmExecution, PmExecution, UpdatePmExecution};
use upkeep_db::models::schedule::PmSchedule;
use upkeep_pm::execution;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Execution row plus its derived duration.
#[derive(Debug, Serialize)]
pub struct ExecutionPayload {
    #[serde(flatten)]
    pub execution: PmExecution,
    pub duration_minutes: Option<i64>,
}

impl From<PmExecution> for ExecutionPayload {
    fn from(execution: PmExecution) -> Self {
        let duration_minutes = execution.duration_minutes();
        Self {
            execution,
            duration_minutes,
        }
    }
}

/// Response for a completed execution: the final record and the schedule it
/// closed.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub execution: ExecutionPayload,
    pub schedule: PmSchedule,
}

/// GET /pm/executions/{id}
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let execution = execution::get_execution(&state.store, id).await?;
    Ok(Json(DataResponse {
        data: ExecutionPayload::from(execution),
    }))
}

/// PATCH /pm/executions/{id}
///
/// Free-form progress save; allowed any number of times while in progress.
pub async fn update_execution(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdatePmExecution>,
) -> AppResult<impl IntoResponse> {
    let execution = execution::update_execution(&state.store, id, &body).await?;
    Ok(Json(DataResponse {
        data: ExecutionPayload::from(execution),
    }))
}

/// POST /pm/executions/{id}/complete
///
/// Fails with 400 naming the unchecked required checklist items.
pub async fn complete_execution(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<CompletePmExecution>,
) -> AppResult<impl IntoResponse> {
    let (execution, schedule) =
        execution::complete_execution(&state.store, id, &body, Utc::now()).await?;
    Ok(Json(DataResponse {
        data: CompletionResponse {
            execution: ExecutionPayload::from(execution),
            schedule,
        },
    }))
}
