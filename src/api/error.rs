//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::archive::ArchiveError;
use crate::core_state::CoreError;
use crate::pipeline::PipelineError;
use crate::signing::SigningError;
use crate::store::StoreError;
use crate::workflow::WorkflowError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Model output unusable: {0}")]
    BadModelOutput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Valid X-Operator-Role header required".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                detail.clone(),
            ),
            ApiError::ModelUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                detail.clone(),
            ),
            ApiError::BadModelOutput(detail) => (
                StatusCode::BAD_GATEWAY,
                "MODEL_OUTPUT",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            WorkflowError::NotShared
            | WorkflowError::AlreadySigned
            | WorkflowError::NotSigned => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::InvalidPayload(_) | PipelineError::UnsupportedType(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PipelineError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            PipelineError::OllamaConnection(_) | PipelineError::NoModelAvailable => {
                ApiError::ModelUnavailable(err.to_string())
            }
            PipelineError::MalformedResponse(_) => ApiError::BadModelOutput(err.to_string()),
            PipelineError::HttpClient(_)
            | PipelineError::OllamaError { .. }
            | PipelineError::ResponseParsing(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        match &err {
            SigningError::InvalidInput(_)
            | SigningError::NotPdf
            | SigningError::NotPng
            | SigningError::PdfParse(_)
            | SigningError::NoPages
            | SigningError::ImageDecode(_) => ApiError::BadRequest(err.to_string()),
            SigningError::PdfEdit(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
