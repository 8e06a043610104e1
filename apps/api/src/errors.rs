use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The variants follow the pipeline's failure taxonomy: input problems
/// (`Validation`, `DocumentRead`) are caught before any network call,
/// inference problems split into transport vs. response-shape so the caller
/// knows whether to retry or report a prompt bug, and `Export` never implies
/// the generated document itself is lost.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not read attached document: {0}")]
    DocumentRead(String),

    #[error("A generation is already in flight for this session")]
    InFlight,

    #[error("Inference transport error: {0}")]
    InferenceTransport(String),

    #[error("Model response did not match the requested shape: {0}")]
    ResponseShape(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DocumentRead(msg) => (
                StatusCode::BAD_REQUEST,
                "DOCUMENT_READ_ERROR",
                format!("Could not read the attached file: {msg}. Re-select the file and try again."),
            ),
            AppError::InFlight => (
                StatusCode::CONFLICT,
                "GENERATION_IN_FLIGHT",
                "A generation is already running. Wait for it to finish before submitting again."
                    .to_string(),
            ),
            AppError::InferenceTransport(msg) => {
                tracing::error!("Inference transport error: {msg}");
                // Service message passes through verbatim — retrying the same
                // submission is the remediation.
                (
                    StatusCode::BAD_GATEWAY,
                    "INFERENCE_TRANSPORT_ERROR",
                    msg.clone(),
                )
            }
            AppError::ResponseShape(msg) => {
                tracing::error!("Response shape error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RESPONSE_SHAPE_ERROR",
                    format!("The model returned output in an unexpected shape: {msg}"),
                )
            }
            AppError::Export(msg) => {
                tracing::error!("Export error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    format!("Export failed: {msg}. The generated document is unaffected."),
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

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            // Could not reach the service, or it refused the request.
            LlmError::Http(e) => AppError::InferenceTransport(e.to_string()),
            LlmError::Api { status, message } => {
                AppError::InferenceTransport(format!("service returned {status}: {message}"))
            }
            // The service answered, but not in the declared shape.
            LlmError::EmptyContent => {
                AppError::ResponseShape("the model returned no text content".to_string())
            }
            LlmError::Parse(e) => AppError::ResponseShape(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_shape_errors_use_distinct_codes() {
        let transport = AppError::InferenceTransport("connection refused".to_string());
        let shape = AppError::ResponseShape("expected array".to_string());
        // Distinct taxonomy entries must not collapse into one message.
        assert_ne!(format!("{transport}"), format!("{shape}"));
    }

    #[test]
    fn test_llm_api_error_maps_to_transport() {
        let err: AppError = LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::InferenceTransport(_)));
    }

    #[test]
    fn test_llm_empty_content_maps_to_shape() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::ResponseShape(_)));
    }
}
