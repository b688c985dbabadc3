use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::info;

use autocontent::TracingSink;
use common::error::AppError;
use common::types::job::{JobPayload, JobState};
use common::types::voice::VoiceAsset;

use crate::{api_state::ApiState, error::ApiError};

use super::JobView;

#[derive(Debug, TryFromMultipart)]
pub struct CloneVoiceParams {
    pub name: String,
    // The upload cap is the configured request body limit applied to this
    // route (`upload_max_bytes`); no separate per-field limit.
    #[form_data(limit = "unlimited")]
    pub audio: FieldData<NamedTempFile>,
}

/// Clone a voice from an uploaded audio sample. The sample is persisted to
/// media storage, the clone job is submitted with its public URL and polled
/// to a terminal state; a completed clone is recorded in the session voice
/// library.
pub async fn clone_voice(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<CloneVoiceParams>,
) -> Result<Response, ApiError> {
    let original_name = input
        .audio
        .metadata
        .file_name
        .clone()
        .unwrap_or_else(|| "voice-sample".to_string());
    let audio = read_upload(&input.audio)?;

    let job = state
        .submission()
        .submit_voice_clone(&input.name, &original_name, audio)
        .await?;
    let job = state
        .poller
        .poll_until_terminal(job, &state.poll_options(), &TracingSink)
        .await?;

    if job.state != JobState::Completed {
        return Ok((StatusCode::OK, Json(JobView::from(&job))).into_response());
    }

    let (name, source_audio_url) = match &job.payload {
        JobPayload::VoiceClone { name, audio_url } => (name.clone(), audio_url.clone()),
        _ => (input.name.clone(), String::new()),
    };
    let result = job.result.clone().unwrap_or(serde_json::Value::Null);
    let asset = VoiceAsset::from_clone_result(&result, &job.id, &name, &source_audio_url);

    let mut library = state.voices.write().await;
    if library.insert(asset.clone()) {
        info!(voice_id = %asset.id, "Recorded cloned voice");
    }

    Ok((StatusCode::CREATED, Json(asset)).into_response())
}

/// Upstream stock voices merged with the voices cloned during this session,
/// preserving the library's discovery order.
pub async fn list_voices(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let mut voices = state.api.list_voices().await?;

    let library = state.voices.read().await;
    for asset in library.iter() {
        if !voices.iter().any(|voice| voice.id == asset.id) {
            voices.push(asset.clone());
        }
    }

    Ok(Json(voices))
}

fn read_upload(field: &FieldData<NamedTempFile>) -> Result<Bytes, ApiError> {
    let data = std::fs::read(field.contents.path()).map_err(AppError::from)?;
    Ok(Bytes::from(data))
}
