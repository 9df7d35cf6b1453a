use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Completion backend is unconfigured or the call failed.
    /// Never silently degraded — the question/feedback text is the product.
    #[error("Completion backend unavailable: {0}")]
    CompletionUnavailable(String),

    /// The completion backend answered, but no text could be extracted
    /// from the response body.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            AppError::CompletionUnavailable(msg) => {
                tracing::error!("Completion unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "COMPLETION_UNAVAILABLE",
                    "The interview AI backend is unavailable".to_string(),
                )
            }
            AppError::MalformedModelOutput(msg) => {
                tracing::error!("Malformed model output: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_MODEL_OUTPUT",
                    "The AI backend returned an unreadable response".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
