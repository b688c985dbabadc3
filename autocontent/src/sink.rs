use common::types::job::{Job, JobState};

/// One observed state change for a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobTransition {
    pub previous: JobState,
    pub current: JobState,
    pub job: Job,
}

/// Where poller transitions are delivered. The UI projector (toast
/// notifications, rendered job cards) lives behind this seam so the polling
/// core stays testable without a UI.
///
/// `notify` is invoked synchronously, exactly once per observed state
/// change, in upstream order for a given job.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &JobTransition);
}

/// Logs every transition with structured fields. Used by the server.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &JobTransition) {
        match event.current {
            JobState::Failed => tracing::warn!(
                job_id = %event.job.id,
                kind = %event.job.kind,
                previous = %event.previous,
                current = %event.current,
                error = event.job.error_message.as_deref().unwrap_or("unknown"),
                "Job failed"
            ),
            _ => tracing::info!(
                job_id = %event.job.id,
                kind = %event.job.kind,
                previous = %event.previous,
                current = %event.current,
                "Job state changed"
            ),
        }
    }
}

/// Discards all events. For callers that only want the returned job.
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &JobTransition) {}
}
