use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use common::error::AppError;
use common::media::MediaStore;
use common::types::job::{Job, JobKind, JobPayload};

use crate::client::ContentApi;

/// Validates and submits jobs to the upstream API. Performs no retries;
/// retry policy belongs to callers.
#[derive(Clone)]
pub struct SubmissionService {
    api: Arc<dyn ContentApi>,
    media: MediaStore,
}

impl SubmissionService {
    pub fn new(api: Arc<dyn ContentApi>, media: MediaStore) -> Self {
        Self { api, media }
    }

    /// Submit a job. Fails fast with a validation error before any network
    /// call when a required field is absent or empty.
    pub async fn submit(&self, payload: JobPayload) -> Result<Job, AppError> {
        validate(&payload)?;

        let kind = payload.kind();
        let created = self
            .api
            .create_job(kind, payload.to_request_body())
            .await
            .map_err(|source| AppError::SubmissionFailed {
                kind,
                source: Box::new(source),
            })?;

        let job_id = extract_job_id(&created, kind)?;
        Ok(Job::submitted(job_id, payload))
    }

    /// Voice-clone submission: the audio is first persisted to media storage
    /// and its public URL substitutes for the raw bytes in the API call.
    pub async fn submit_voice_clone(
        &self,
        name: &str,
        original_file_name: &str,
        audio: Bytes,
    ) -> Result<Job, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation("name"));
        }
        if audio.is_empty() {
            return Err(AppError::validation("audio"));
        }

        let upload = self.media.store_upload(original_file_name, audio).await?;
        tracing::info!(key = %upload.key, "Stored voice-clone audio");

        self.submit(JobPayload::VoiceClone {
            name: name.trim().to_string(),
            audio_url: upload.url,
        })
        .await
    }
}

fn validate(payload: &JobPayload) -> Result<(), AppError> {
    match payload {
        JobPayload::ContentGeneration { text, output_type } => {
            require_non_empty(text, "text")?;
            require_non_empty(output_type, "output_type")
        }
        JobPayload::SentimentAnalysis { text } | JobPayload::ArgumentationAnalysis { text } => {
            require_non_empty(text, "text")
        }
        JobPayload::VoiceClone { name, audio_url } => {
            require_non_empty(name, "name")?;
            require_non_empty(audio_url, "audio")
        }
        JobPayload::StatusCheck { .. } => Err(AppError::Internal(
            "Status checks are not submitted as new jobs".to_string(),
        )),
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field));
    }
    Ok(())
}

/// The creation response carries the identifier under a kind-specific field
/// name; `JobKind::job_id_field` is the single source of truth for it.
fn extract_job_id(created: &Value, kind: JobKind) -> Result<String, AppError> {
    let field = kind.job_id_field();
    created
        .get(field)
        .and_then(|value| {
            value
                .as_str()
                .map(str::to_string)
                .or_else(|| value.as_u64().map(|n| n.to_string()))
        })
        .ok_or_else(|| AppError::SubmissionFailed {
            kind,
            source: Box::new(AppError::Internal(format!(
                "Creation response is missing the '{field}' field"
            ))),
        })
}
