use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use upkeep_core::error::CoreError;
use upkeep_db::StoreError;
use upkeep_pm::PmError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PmError`] for engine errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An engine error (domain or storage).
    #[error(transparent)]
    Pm(#[from] PmError),

    /// A storage error from a direct store call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Pm(PmError::Core(core)) => classify_core_error(core),
            AppError::Pm(PmError::Store(err)) | AppError::Store(err) => {
                classify_store_error(err)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, error code, and message.
///
/// Not-found maps to 404, validation failures to 400, and every state
/// violation to 409 with a condition-specific code so callers can react.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let code = match err {
        CoreError::NotFound { .. } => return (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Validation(_) => {
            return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        CoreError::RequiredItemsIncomplete { .. } => {
            return (
                StatusCode::BAD_REQUEST,
                "REQUIRED_ITEMS_INCOMPLETE",
                err.to_string(),
            )
        }
        CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
        CoreError::AlreadyInProgress { .. } => "ALREADY_IN_PROGRESS",
        CoreError::AlreadyCompleted { .. } => "ALREADY_COMPLETED",
        CoreError::NotCancellable { .. } => "NOT_CANCELLABLE",
        CoreError::NotDeletable { .. } => "NOT_DELETABLE",
        CoreError::ExecutionExists { .. } => "EXECUTION_EXISTS",
        CoreError::TemplateInUse { .. } => "TEMPLATE_IN_USE",
    };
    (StatusCode::CONFLICT, code, err.to_string())
}

/// Map a storage error. Key conflicts map to 409; everything else is a 500
/// with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
