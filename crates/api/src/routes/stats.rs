//! Route definitions for the `/pm/stats` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Routes mounted at `/pm/stats`.
///
/// ```text
/// GET /dashboard   -> dashboard
/// GET /compliance  -> compliance_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(stats::dashboard))
        .route("/compliance", get(stats::compliance_stats))
}
