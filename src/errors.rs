use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to an HTTP caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// The completion handle was dropped without a decision (loop shut down).
    #[error("decision unavailable")]
    DecisionUnavailable,
}

/// Failure to deliver an outcome through a [`crate::processor::CompletionHandle`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("completion handle already resolved")]
    AlreadyResolved,

    #[error("caller disconnected before resolution")]
    CallerGone,
}

/// A decision source could not produce any answer at all.
///
/// An answer the operator gave but that is not an approval is a rejection,
/// never an `OperatorError`.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("operator input closed")]
    InputClosed,

    #[error("operator input failed: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::DecisionUnavailable => {
                tracing::error!("completion handle dropped without a decision");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "processor_error",
                    "decision_unavailable",
                    "el procesador se detuvo antes de decidir".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
