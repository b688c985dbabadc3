use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use serde_json::Value;

use api_router::{api_routes_v1, api_state::ApiState};
use autocontent::ContentApi;
use common::error::AppError;
use common::media::MediaStore;
use common::types::job::{JobKind, StatusSnapshot};
use common::types::voice::VoiceAsset;
use common::utils::config::{AppConfig, StorageKind};

/// A scripted stand-in for the upstream AutoContent API. Status snapshots
/// are consumed in order; the last one repeats.
pub struct ScriptedUpstream {
    pub create_response: Value,
    pub statuses: Mutex<Vec<StatusSnapshot>>,
    pub voices: Vec<VoiceAsset>,
    pub status_failure: Option<u16>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedUpstream {
    pub fn new(create_response: Value, statuses: Vec<StatusSnapshot>) -> Arc<Self> {
        Arc::new(Self {
            create_response,
            statuses: Mutex::new(statuses),
            voices: Vec::new(),
            status_failure: None,
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        })
    }

    pub fn with_voices(
        create_response: Value,
        statuses: Vec<StatusSnapshot>,
        voices: Vec<VoiceAsset>,
    ) -> Arc<Self> {
        Arc::new(Self {
            create_response,
            statuses: Mutex::new(statuses),
            voices,
            status_failure: None,
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing_status(status: u16) -> Arc<Self> {
        Arc::new(Self {
            create_response: Value::Null,
            statuses: Mutex::new(Vec::new()),
            voices: Vec::new(),
            status_failure: Some(status),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        })
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentApi for ScriptedUpstream {
    async fn create_job(&self, _kind: JobKind, _body: Value) -> Result<Value, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.create_response.clone())
    }

    async fn job_status(&self, _job_id: &str) -> Result<StatusSnapshot, AppError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.status_failure {
            return Err(AppError::Upstream {
                status,
                body: "scripted upstream failure".to_string(),
            });
        }

        let mut statuses = self.statuses.lock().expect("statuses lock");
        if statuses.len() > 1 {
            Ok(statuses.remove(0))
        } else {
            statuses
                .first()
                .cloned()
                .ok_or_else(|| AppError::Internal("status script exhausted".to_string()))
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceAsset>, AppError> {
        Ok(self.voices.clone())
    }
}

/// Test configuration: in-memory storage, a 1 ms poll interval and a small
/// attempt budget so timeout paths run quickly.
pub fn test_config() -> AppConfig {
    AppConfig {
        autocontent_api_key: "test".into(),
        autocontent_base_url: "https://api.autocontentapi.com".into(),
        http_port: 0,
        public_base_url: "http://127.0.0.1:3000/api/v1".into(),
        data_dir: "/tmp/unused".into(), // Ignored for memory storage
        storage: StorageKind::Memory,
        poll_interval_ms: 1,
        poll_max_attempts: 3,
        request_timeout_secs: 30,
        upload_max_bytes: 25_000_000,
    }
}

pub fn setup_server(upstream: Arc<ScriptedUpstream>) -> (TestServer, ApiState) {
    setup_server_with_config(upstream, test_config())
}

pub fn setup_server_with_config(
    upstream: Arc<ScriptedUpstream>,
    config: AppConfig,
) -> (TestServer, ApiState) {
    let media =
        MediaStore::in_memory(&config.public_base_url).expect("in-memory media store");
    let state = ApiState::with_api(&config, upstream, media);

    let app = Router::new()
        .nest("/api/v1", api_routes_v1(&state))
        .with_state(state.clone());

    let server = TestServer::new(app).expect("test server");
    (server, state)
}
