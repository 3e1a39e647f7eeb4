//! Route definitions for the `/pm/sweeps` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::sweeps;
use crate::state::AppState;

/// Routes mounted at `/pm/sweeps`.
///
/// ```text
/// POST /overdue        -> run_overdue_sweep
/// POST /notifications  -> run_notification_sweep
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overdue", post(sweeps::run_overdue_sweep))
        .route("/notifications", post(sweeps::run_notification_sweep))
}
