use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Local => "local",
            StorageKind::Memory => "memory",
        }
    }
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Local
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub autocontent_api_key: String,
    #[serde(default = "default_base_url")]
    pub autocontent_base_url: String,
    pub http_port: u16,
    /// External base URL clients can reach this service on. Stored media is
    /// advertised as `<public_base_url>/media/<key>`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_storage_kind")]
    pub storage: StorageKind,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: usize,
}

fn default_base_url() -> String {
    "https://api.autocontentapi.com".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/api/v1".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_poll_max_attempts() -> u32 {
    150
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_upload_max_bytes() -> usize {
    25_000_000
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "autocontent_api_key": "key",
            "http_port": 3000
        }))
        .expect("minimal config deserializes");

        assert_eq!(config.autocontent_base_url, "https://api.autocontentapi.com");
        assert_eq!(config.storage, StorageKind::Local);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.poll_max_attempts, 150);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.upload_max_bytes, 25_000_000);
    }
}
