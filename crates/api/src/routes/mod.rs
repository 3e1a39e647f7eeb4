//! Route tree for the API.

pub mod executions;
pub mod health;
pub mod schedules;
pub mod stats;
pub mod sweeps;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pm/templates                      list, create
/// /pm/templates/{id}                 get, update, delete
///
/// /pm/schedules                      list
/// /pm/schedules/generate             generate series (POST)
/// /pm/schedules/{id}                 get, delete
/// /pm/schedules/{id}/start           start execution (POST)
/// /pm/schedules/{id}/cancel          cancel (POST)
///
/// /pm/executions/{id}                get, progress save (PATCH)
/// /pm/executions/{id}/complete       complete (POST)
///
/// /pm/sweeps/overdue                 run overdue sweep now (POST)
/// /pm/sweeps/notifications           run notification sweep now (POST)
///
/// /pm/stats/dashboard                dashboard counters (GET)
/// /pm/stats/compliance               per-month compliance (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pm/templates", templates::router())
        .nest("/pm/schedules", schedules::router())
        .nest("/pm/executions", executions::router())
        .nest("/pm/sweeps", sweeps::router())
        .nest("/pm/stats", stats::router())
}
