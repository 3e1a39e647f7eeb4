//! Route definitions for the `/pm/executions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::executions;
use crate::state::AppState;

/// Routes mounted at `/pm/executions`.
///
/// ```text
/// GET    /{id}            -> get_execution
/// PATCH  /{id}            -> update_execution
/// POST   /{id}/complete   -> complete_execution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(executions::get_execution).patch(executions::update_execution),
        )
        .route("/{id}/complete", post(executions::complete_execution))
}
