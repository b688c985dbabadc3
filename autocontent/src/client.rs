use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use common::error::AppError;
use common::types::job::{JobKind, StatusSnapshot};
use common::types::voice::VoiceAsset;
use common::utils::config::AppConfig;

/// Seam over the upstream AutoContent API. Handlers and the poller depend on
/// this trait so tests can script responses without a network.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Create a job of the given kind and return the raw creation response.
    /// Not idempotent: re-invoking creates a new upstream job.
    async fn create_job(&self, kind: JobKind, body: Value) -> Result<Value, AppError>;

    /// One status check for the given job identifier. Idempotent.
    async fn job_status(&self, job_id: &str) -> Result<StatusSnapshot, AppError>;

    /// List the voices available upstream.
    async fn list_voices(&self) -> Result<Vec<VoiceAsset>, AppError>;
}

/// HTTP client for the upstream AutoContent API. Joins a configured base URL
/// with relative paths and authenticates with a bearer token. The token is
/// never logged.
pub struct AutoContentClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl AutoContentClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        // A trailing slash keeps Url::join from eating the last path segment.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &cfg.autocontent_base_url,
            &cfg.autocontent_api_key,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    /// Issue one request. Non-2xx responses surface the raw upstream body;
    /// network-level failures surface as transport errors.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), AppError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%method, %path, status = status.as_u16(), "Upstream returned an error");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok((status, parsed))
    }
}

#[async_trait]
impl ContentApi for AutoContentClient {
    async fn create_job(&self, kind: JobKind, body: Value) -> Result<Value, AppError> {
        let path = kind.creation_path().ok_or_else(|| {
            AppError::Internal(format!("Job kind {kind} has no upstream creation endpoint"))
        })?;

        let (_, parsed) = self.request(Method::POST, path, Some(&body)).await?;
        Ok(parsed)
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusSnapshot, AppError> {
        let path = format!("content/status/{job_id}");
        let (_, parsed) = self.request(Method::GET, &path, None).await?;
        Ok(serde_json::from_value(parsed)?)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceAsset>, AppError> {
        let (_, parsed) = self.request(Method::GET, "Content/GetVoices", None).await?;

        // The endpoint has been observed returning both a bare array and a
        // wrapper object.
        let voices = match parsed {
            Value::Array(_) => serde_json::from_value(parsed)?,
            Value::Object(ref map) if map.contains_key("voices") => {
                serde_json::from_value(map["voices"].clone())?
            }
            Value::Null => Vec::new(),
            other => {
                return Err(AppError::Internal(format!(
                    "Unexpected voice list shape: {other}"
                )))
            }
        };

        Ok(voices)
    }
}
