use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use autocontent::TracingSink;
use common::types::job::{Job, JobKind, JobPayload, JobState};

use crate::{api_state::ApiState, error::ApiError};

pub mod analysis;
pub mod content;
pub mod jobs;
pub mod liveness;
pub mod media;
pub mod readiness;
pub mod voices;

/// Read-only projection of a job for API responses. Failed jobs always carry
/// a human-readable message, falling back to a generic one when the upstream
/// gave no diagnostic.
#[derive(Serialize, Debug)]
pub struct JobView {
    pub job_id: String,
    pub kind: JobKind,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        let error = match job.state {
            JobState::Failed => Some(
                job.error_message
                    .clone()
                    .unwrap_or_else(|| "The job failed without a diagnostic message".to_string()),
            ),
            _ => None,
        };

        Self {
            job_id: job.id.clone(),
            kind: job.kind,
            state: job.state,
            result: job.result.clone(),
            error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    #[serde(default)]
    pub wait: bool,
}

/// Submit a job and either return its identifier right away (202) or poll it
/// to a terminal state within the request (200).
pub(crate) async fn submit_and_maybe_wait(
    state: &ApiState,
    payload: JobPayload,
    wait: bool,
) -> Result<Response, ApiError> {
    let job = state.submission().submit(payload).await?;
    info!(job_id = %job.id, kind = %job.kind, wait, "Submitted job");

    if wait {
        let job = state
            .poller
            .poll_until_terminal(job, &state.poll_options(), &TracingSink)
            .await?;
        Ok((StatusCode::OK, Json(JobView::from(&job))).into_response())
    } else {
        Ok((StatusCode::ACCEPTED, Json(JobView::from(&job))).into_response())
    }
}
