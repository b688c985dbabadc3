use thiserror::Error;

use crate::types::job::JobKind;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: missing or empty field '{field}'")]
    Validation { field: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("Submission failed for {kind}: {source}")]
    SubmissionFailed {
        kind: JobKind,
        #[source]
        source: Box<AppError>,
    },
    #[error("Poll budget exhausted for job {job_id} after {attempts} attempts")]
    PollTimeout { job_id: String, attempts: u32 },
    #[error("Job {job_id} is already being polled")]
    AlreadyPolling { job_id: String },
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
        }
    }
}
