use std::sync::Arc;

use tokio::sync::RwLock;

use autocontent::{AutoContentClient, ContentApi, PollOptions, StatusPoller, SubmissionService};
use common::error::AppError;
use common::media::MediaStore;
use common::types::voice::VoiceLibrary;
use common::utils::config::AppConfig;

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub api: Arc<dyn ContentApi>,
    pub media: MediaStore,
    pub poller: StatusPoller,
    pub voices: Arc<RwLock<VoiceLibrary>>,
}

impl ApiState {
    pub fn new(config: &AppConfig, media: MediaStore) -> Result<Self, AppError> {
        let api: Arc<dyn ContentApi> = Arc::new(AutoContentClient::from_config(config)?);
        Ok(Self::with_api(config, api, media))
    }

    /// Build state around an injected upstream implementation. Used by tests
    /// to script the upstream.
    pub fn with_api(config: &AppConfig, api: Arc<dyn ContentApi>, media: MediaStore) -> Self {
        Self {
            config: config.clone(),
            api: Arc::clone(&api),
            media,
            poller: StatusPoller::new(api),
            voices: Arc::new(RwLock::new(VoiceLibrary::new())),
        }
    }

    pub fn submission(&self) -> SubmissionService {
        SubmissionService::new(Arc::clone(&self.api), self.media.clone())
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from_config(&self.config)
    }
}
