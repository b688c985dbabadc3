use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Job {job_id} is still processing")]
    StillProcessing { job_id: String, attempts: u32 },
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation { field } => {
                Self::ValidationError(format!("Missing or empty field '{field}'"))
            }
            AppError::Upstream { status: 404, .. } => {
                Self::NotFound("Unknown job or resource".to_string())
            }
            AppError::Upstream { status, body } => {
                tracing::warn!(status, "Upstream rejected the request");
                Self::UpstreamFailure(format!("Upstream responded with {status}: {body}"))
            }
            AppError::Transport(e) => {
                tracing::warn!(error = %e, "Upstream unreachable");
                Self::UpstreamFailure("Upstream service is unreachable".to_string())
            }
            AppError::SubmissionFailed { kind, source } => match *source {
                AppError::Validation { field } => {
                    Self::ValidationError(format!("Missing or empty field '{field}'"))
                }
                other => {
                    tracing::warn!(kind = %kind, error = %other, "Submission failed");
                    Self::UpstreamFailure(format!("Could not submit {kind} job"))
                }
            },
            AppError::PollTimeout { job_id, attempts } => {
                Self::StillProcessing { job_id, attempts }
            }
            AppError::AlreadyPolling { job_id } => {
                Self::Conflict(format!("Job {job_id} is already being polled"))
            }
            AppError::NotFound(msg) => Self::NotFound(msg),
            AppError::Storage(object_store::Error::NotFound { .. }) => {
                Self::NotFound("Stored object not found".to_string())
            }
            _ => {
                tracing::error!("Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Poll-budget exhaustion is not a failure; tell the caller to check
        // back later instead of reporting an error.
        if let Self::StillProcessing { job_id, attempts } = &self {
            return (
                StatusCode::ACCEPTED,
                Json(json!({
                    "status": "processing",
                    "job_id": job_id,
                    "attempts": attempts,
                    "message": "The job is still processing, check back later",
                })),
            )
                .into_response();
        }

        let (status, error_response) = match self {
            Self::InternalError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::UpstreamFailure(message) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::StillProcessing { .. } => unreachable!("handled above"),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
}
