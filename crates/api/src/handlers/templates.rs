//! Handlers for PM template endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use upkeep_core::checklist::{ChecklistItem, RequiredPart};
use upkeep_core::types::DbId;
use upkeep_db::models::template::{CreatePmTemplate, UpdatePmTemplate};
use upkeep_pm::registry;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for creating a template.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub interval_type: String,
    #[validate(range(min = 1))]
    pub interval_value: i32,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    pub required_parts: Vec<RequiredPart>,
    pub estimated_duration_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
pub struct TemplateListParams {
    #[serde(default)]
    pub active_only: bool,
}

/// POST /pm/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<CreateTemplateRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let input = CreatePmTemplate {
        name: body.name,
        description: body.description,
        interval_type: body.interval_type,
        interval_value: body.interval_value,
        checklist_items: body.checklist_items,
        required_parts: body.required_parts,
        estimated_duration_minutes: body.estimated_duration_minutes,
        is_active: body.is_active,
    };
    let template = registry::create_template(&state.store, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /pm/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> AppResult<impl IntoResponse> {
    let templates = registry::list_templates(&state.store, params.active_only).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /pm/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = registry::get_template(&state.store, id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /pm/templates/{id}
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdatePmTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = registry::update_template(&state.store, id, &body).await?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /pm/templates/{id}
///
/// Refused with 409 while any schedule references the template.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    registry::delete_template(&state.store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
