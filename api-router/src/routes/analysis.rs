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
pub struct AnalysisRequest {
    pub text: String,
}

pub async fn analyze_sentiment(
    State(state): State<ApiState>,
    Query(query): Query<WaitQuery>,
    Json(input): Json<AnalysisRequest>,
) -> Result<Response, ApiError> {
    submit_and_maybe_wait(
        &state,
        JobPayload::SentimentAnalysis { text: input.text },
        query.wait,
    )
    .await
}

pub async fn analyze_argumentation(
    State(state): State<ApiState>,
    Query(query): Query<WaitQuery>,
    Json(input): Json<AnalysisRequest>,
) -> Result<Response, ApiError> {
    submit_and_maybe_wait(
        &state,
        JobPayload::ArgumentationAnalysis { text: input.text },
        query.wait,
    )
    .await
}
