use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use common::error::AppError;
use common::types::job::Job;
use common::utils::config::AppConfig;

use crate::client::ContentApi;
use crate::sink::{EventSink, JobTransition};

/// Options for one polling run.
#[derive(Clone)]
pub struct PollOptions {
    /// Delay between status checks.
    pub interval: Duration,
    /// Attempt budget; `None` polls until a terminal state.
    pub max_attempts: Option<u32>,
    /// External cancellation. Takes effect at tick boundaries; an in-flight
    /// status request completes but its result is discarded.
    pub cancel: CancellationToken,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl PollOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            interval: Duration::from_millis(cfg.poll_interval_ms),
            max_attempts: Some(cfg.poll_max_attempts),
            cancel: CancellationToken::new(),
        }
    }
}

/// Tracks which job identifiers currently have an active poll loop. Shared
/// by value; clones observe the same set.
#[derive(Clone, Default)]
pub struct PollRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-then-insert: either this call claims the identifier or
    /// someone else already holds it.
    fn try_register(&self, job_id: &str) -> Result<PollGuard, AppError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(job_id.to_string()) {
            return Err(AppError::AlreadyPolling {
                job_id: job_id.to_string(),
            });
        }
        Ok(PollGuard {
            active: Arc::clone(&self.active),
            job_id: job_id.to_string(),
        })
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(job_id)
    }
}

/// Releases the registration on every exit path, including errors and
/// cancellation.
struct PollGuard {
    active: Arc<Mutex<HashSet<String>>>,
    job_id: String,
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.job_id);
    }
}

/// Drives a job to a terminal state by polling the upstream status endpoint
/// on a fixed interval, emitting one event per observed state change.
#[derive(Clone)]
pub struct StatusPoller {
    api: Arc<dyn ContentApi>,
    registry: PollRegistry,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            registry: PollRegistry::new(),
        }
    }

    pub fn with_registry(api: Arc<dyn ContentApi>, registry: PollRegistry) -> Self {
        Self { api, registry }
    }

    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    /// Poll until the job reaches `completed` or `failed`.
    ///
    /// Returns the final job on terminal states and on cancellation (the
    /// last-known job; cancellation is not a failure). Fails with
    /// `AlreadyPolling` when a loop for this identifier is active, and with
    /// `PollTimeout` when the attempt budget runs out while the job is still
    /// non-terminal.
    pub async fn poll_until_terminal(
        &self,
        mut job: Job,
        options: &PollOptions,
        sink: &dyn EventSink,
    ) -> Result<Job, AppError> {
        let _guard = self.registry.try_register(&job.id)?;
        let mut attempts: u32 = 0;

        loop {
            if options.cancel.is_cancelled() {
                tracing::debug!(job_id = %job.id, attempts, "Polling cancelled");
                return Ok(job);
            }

            let snapshot = self.api.job_status(&job.id).await?;
            attempts = attempts.saturating_add(1);

            // Cancellation requested while the request was in flight: the
            // request was allowed to finish, its result is discarded.
            if options.cancel.is_cancelled() {
                tracing::debug!(job_id = %job.id, attempts, "Polling cancelled mid-flight");
                return Ok(job);
            }

            let previous = job.state;
            match job.observe(&snapshot) {
                Ok(true) => sink.notify(&JobTransition {
                    previous,
                    current: job.state,
                    job: job.clone(),
                }),
                Ok(false) => {}
                Err(err) => tracing::warn!(
                    job_id = %job.id,
                    status = %snapshot.status,
                    error = %err,
                    "Ignoring invalid upstream transition"
                ),
            }

            if job.state.is_terminal() {
                return Ok(job);
            }

            if let Some(max_attempts) = options.max_attempts {
                if attempts >= max_attempts {
                    return Err(AppError::PollTimeout {
                        job_id: job.id.clone(),
                        attempts,
                    });
                }
            }

            sleep(options.interval).await;
        }
    }
}
