use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::warn;

use autocontent::TracingSink;
use common::types::job::Job;

use crate::{api_state::ApiState, error::ApiError};

use super::JobView;

/// One status check: a single upstream request, no polling.
pub async fn job_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.api.job_status(&id).await?;

    let mut job = Job::for_status_check(&id);
    if let Err(err) = job.observe(&snapshot) {
        warn!(job_id = %id, error = %err, "Ignoring invalid upstream transition");
    }

    Ok(Json(JobView::from(&job)))
}

/// Poll the job to a terminal state with the configured interval and attempt
/// budget. An exhausted budget answers 202 rather than an error.
pub async fn wait_for_job(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .poller
        .poll_until_terminal(
            Job::for_status_check(&id),
            &state.poll_options(),
            &TracingSink,
        )
        .await?;

    Ok(Json(JobView::from(&job)))
}
