use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use state_machines::state_machine;

use crate::error::AppError;

/// The kinds of asynchronous work the upstream AutoContent API performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ContentGeneration,
    SentimentAnalysis,
    ArgumentationAnalysis,
    VoiceClone,
    StatusCheck,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::ContentGeneration => "content_generation",
            JobKind::SentimentAnalysis => "sentiment_analysis",
            JobKind::ArgumentationAnalysis => "argumentation_analysis",
            JobKind::VoiceClone => "voice_clone",
            JobKind::StatusCheck => "status_check",
        }
    }

    /// Upstream creation endpoint for this kind. `StatusCheck` jobs are never
    /// created upstream; they wrap an existing identifier.
    pub fn creation_path(&self) -> Option<&'static str> {
        match self {
            JobKind::ContentGeneration => Some("content/Create"),
            JobKind::SentimentAnalysis => Some("content/SentimentAnalysis"),
            JobKind::ArgumentationAnalysis => Some("content/ArgumentationAnalysis"),
            JobKind::VoiceClone => Some("Content/CloneVoice"),
            JobKind::StatusCheck => None,
        }
    }

    /// Field carrying the job identifier in the upstream creation response.
    /// The upstream is not consistent across endpoints, so the mapping lives
    /// here and nowhere else.
    pub fn job_id_field(&self) -> &'static str {
        match self {
            JobKind::VoiceClone => "id",
            _ => "request_id",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// The single mapping table from the upstream status vocabulary onto the
    /// internal states. An unknown status is treated as still processing and
    /// logged for investigation.
    pub fn from_upstream(raw: &str) -> JobState {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "created" => JobState::Pending,
            "in_progress" | "processing" | "running" => JobState::Processing,
            "done" | "completed" | "success" | "succeeded" => JobState::Completed,
            "error" | "failed" => JobState::Failed,
            other => {
                tracing::warn!(status = %other, "Unknown upstream status, treating as processing");
                JobState::Processing
            }
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum JobEvent {
    StartProcessing,
    Complete,
    Fail,
}

impl JobEvent {
    fn as_str(&self) -> &'static str {
        match self {
            JobEvent::StartProcessing => "start_processing",
            JobEvent::Complete => "complete",
            JobEvent::Fail => "fail",
        }
    }
}

mod lifecycle {
    use super::state_machine;

    state_machine! {
        name: JobLifecycleMachine,
        initial: Pending,
        states: [Pending, Processing, Completed, Failed],
        events {
            start_processing {
                transition: { from: Pending, to: Processing }
            }
            complete {
                transition: { from: Pending, to: Completed }
                transition: { from: Processing, to: Completed }
            }
            fail {
                transition: { from: Pending, to: Failed }
                transition: { from: Processing, to: Failed }
            }
        }
    }

    pub(super) fn pending() -> JobLifecycleMachine<(), Pending> {
        JobLifecycleMachine::new(())
    }

    pub(super) fn processing() -> JobLifecycleMachine<(), Processing> {
        pending()
            .start_processing()
            .expect("start_processing transition from Pending should exist")
    }
}

fn invalid_transition(state: &JobState, event: JobEvent) -> AppError {
    AppError::Internal(format!(
        "Invalid job transition: {} -> {}",
        state.as_str(),
        event.as_str()
    ))
}

fn compute_next_state(state: &JobState, event: JobEvent) -> Result<JobState, AppError> {
    use lifecycle::*;
    match (state, event) {
        (JobState::Pending, JobEvent::StartProcessing) => pending()
            .start_processing()
            .map(|_| JobState::Processing)
            .map_err(|_| invalid_transition(state, event)),
        (JobState::Pending, JobEvent::Complete) => pending()
            .complete()
            .map(|_| JobState::Completed)
            .map_err(|_| invalid_transition(state, event)),
        (JobState::Pending, JobEvent::Fail) => pending()
            .fail()
            .map(|_| JobState::Failed)
            .map_err(|_| invalid_transition(state, event)),
        (JobState::Processing, JobEvent::Complete) => processing()
            .complete()
            .map(|_| JobState::Completed)
            .map_err(|_| invalid_transition(state, event)),
        (JobState::Processing, JobEvent::Fail) => processing()
            .fail()
            .map(|_| JobState::Failed)
            .map_err(|_| invalid_transition(state, event)),
        _ => Err(invalid_transition(state, event)),
    }
}

/// The event an observed upstream state implies. `Pending` implies none: a
/// job never moves back to pending once submitted.
fn event_for(observed: &JobState) -> Option<JobEvent> {
    match observed {
        JobState::Pending => None,
        JobState::Processing => Some(JobEvent::StartProcessing),
        JobState::Completed => Some(JobEvent::Complete),
        JobState::Failed => Some(JobEvent::Fail),
    }
}

/// One status response from the upstream job-status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub status: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default, alias = "message")]
    pub error_message: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            result: None,
            error_message: None,
        }
    }
}

/// Kind-specific input for a job. Immutable after submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobPayload {
    ContentGeneration { text: String, output_type: String },
    SentimentAnalysis { text: String },
    ArgumentationAnalysis { text: String },
    VoiceClone { name: String, audio_url: String },
    StatusCheck { job_id: String },
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::ContentGeneration { .. } => JobKind::ContentGeneration,
            JobPayload::SentimentAnalysis { .. } => JobKind::SentimentAnalysis,
            JobPayload::ArgumentationAnalysis { .. } => JobKind::ArgumentationAnalysis,
            JobPayload::VoiceClone { .. } => JobKind::VoiceClone,
            JobPayload::StatusCheck { .. } => JobKind::StatusCheck,
        }
    }

    /// Serialize into the body the upstream creation endpoint expects.
    pub fn to_request_body(&self) -> Value {
        match self {
            JobPayload::ContentGeneration { text, output_type } => json!({
                "text": text,
                "outputType": output_type,
            }),
            JobPayload::SentimentAnalysis { text }
            | JobPayload::ArgumentationAnalysis { text } => json!({ "text": text }),
            JobPayload::VoiceClone { name, audio_url } => json!({
                "name": name,
                "audio_url": audio_url,
            }),
            JobPayload::StatusCheck { job_id } => json!({ "request_id": job_id }),
        }
    }
}

/// One unit of asynchronous work submitted to the upstream content API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub kind: JobKind,
    pub state: JobState,
    pub payload: JobPayload,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A job whose identifier was just handed back by the upstream creation
    /// endpoint.
    pub fn submitted(id: String, payload: JobPayload) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: payload.kind(),
            state: JobState::Pending,
            payload,
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Wraps an already-known identifier so its status can be followed.
    pub fn for_status_check(job_id: &str) -> Self {
        Self::submitted(
            job_id.to_string(),
            JobPayload::StatusCheck {
                job_id: job_id.to_string(),
            },
        )
    }

    /// Apply one upstream status observation. Returns whether the state
    /// changed. Observations that would leave a terminal state or move the
    /// job backwards are rejected.
    pub fn observe(&mut self, snapshot: &StatusSnapshot) -> Result<bool, AppError> {
        let observed = JobState::from_upstream(&snapshot.status);
        if observed == self.state {
            return Ok(false);
        }

        let event = event_for(&observed).ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid job transition: {} -> {}",
                self.state.as_str(),
                observed.as_str()
            ))
        })?;
        self.state = compute_next_state(&self.state, event)?;
        self.updated_at = Utc::now();

        match self.state {
            JobState::Completed => self.result = snapshot.result.clone(),
            JobState::Failed => self.error_message = snapshot.error_message.clone(),
            _ => {}
        }

        Ok(true)
    }
}
