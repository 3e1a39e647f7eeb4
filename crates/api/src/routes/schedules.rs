//! Route definitions for the `/pm/schedules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Routes mounted at `/pm/schedules`.
///
/// ```text
/// GET    /               -> list_schedules
/// POST   /generate       -> generate_schedules
/// GET    /{id}           -> get_schedule
/// DELETE /{id}           -> delete_schedule
/// POST   /{id}/start     -> start_execution
/// POST   /{id}/cancel    -> cancel_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schedules::list_schedules))
        .route("/generate", post(schedules::generate_schedules))
        .route(
            "/{id}",
            get(schedules::get_schedule).delete(schedules::delete_schedule),
        )
        .route("/{id}/start", post(schedules::start_execution))
        .route("/{id}/cancel", post(schedules::cancel_schedule))
}
