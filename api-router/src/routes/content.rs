use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;

use common::types::job::JobPayload;

use crate::{api_state::ApiState, error::ApiError};

use super::{submit_and_maybe_wait, WaitQuery};

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub text: String,
    #[serde(default = "default_output_type")]
    pub output_type: String,
}

fn default_output_type() -> String {
    "summary".to_string()
}

pub async fn create_content(
    State(state): State<ApiState>,
    Query(query): Query<WaitQuery>,
    Json(input): Json<GenerateContentRequest>,
) -> Result<Response, ApiError> {
    let payload = JobPayload::ContentGeneration {
        text: input.text,
        output_type: input.output_type,
    };
    submit_and_maybe_wait(&state, payload, query.wait).await
}
