use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use mime_guess::from_path;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{path::Path as ObjPath, ObjectStore};
use url::Url;

use crate::error::AppError;
use crate::utils::config::{AppConfig, StorageKind};

pub type DynStore = Arc<dyn ObjectStore>;

/// A stored upload: the object key plus the externally reachable URL that
/// substitutes for the raw bytes in upstream API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub key: String,
    pub url: String,
}

/// Media storage for user uploads (voice-clone audio). Backed by
/// `object_store` with a local filesystem or in-memory backend.
#[derive(Clone)]
pub struct MediaStore {
    store: DynStore,
    backend_kind: StorageKind,
    public_base: Url,
}

impl MediaStore {
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let store: DynStore = match cfg.storage {
            StorageKind::Local => {
                let base = Path::new(&cfg.data_dir);
                if !base.exists() {
                    tokio::fs::create_dir_all(base).await?;
                }
                Arc::new(LocalFileSystem::new_with_prefix(base)?)
            }
            StorageKind::Memory => Arc::new(InMemory::new()),
        };

        Ok(Self {
            store,
            backend_kind: cfg.storage.clone(),
            public_base: parse_public_base(&cfg.public_base_url)?,
        })
    }

    /// In-memory store, used in tests and for ephemeral deployments.
    pub fn in_memory(public_base_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            store: Arc::new(InMemory::new()),
            backend_kind: StorageKind::Memory,
            public_base: parse_public_base(public_base_url)?,
        })
    }

    pub fn backend_kind(&self) -> &StorageKind {
        &self.backend_kind
    }

    /// Persist an upload under a deterministic, collision-free key and
    /// return its public URL.
    ///
    /// Keys are `uploads/<submission ms timestamp>-<sanitized name>`.
    pub async fn store_upload(
        &self,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredUpload, AppError> {
        let key = format!(
            "uploads/{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        self.put(&key, data).await?;

        let url = self.public_base.join(&format!("media/{key}"))?;
        Ok(StoredUpload {
            key,
            url: url.to_string(),
        })
    }

    pub async fn put(&self, location: &str, data: Bytes) -> Result<(), AppError> {
        let path = ObjPath::from(location);
        let payload = object_store::PutPayload::from_bytes(data);
        self.store.put(&path, payload).await?;
        Ok(())
    }

    pub async fn get(&self, location: &str) -> Result<Bytes, AppError> {
        let path = ObjPath::from(location);
        let result = self.store.get(&path).await?;
        Ok(result.bytes().await?)
    }

    pub async fn exists(&self, location: &str) -> Result<bool, AppError> {
        let path = ObjPath::from(location);
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Guesses the MIME type for a stored object from its file extension.
pub fn guess_mime_type(name: &str) -> String {
    from_path(Path::new(name))
        .first_or(mime::APPLICATION_OCTET_STREAM)
        .to_string()
}

/// Sanitizes a client-supplied file name to prevent directory traversal.
/// Replaces any character outside `[A-Za-z0-9_]` (excluding the extension
/// dot) with an underscore.
fn sanitize_file_name(file_name: &str) -> String {
    let map_char = |c: char| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    };

    if let Some(idx) = file_name.rfind('.') {
        let (name, ext) = file_name.split_at(idx);
        let sanitized: String = name.chars().map(map_char).collect();
        format!("{sanitized}{ext}")
    } else {
        file_name.chars().map(map_char).collect()
    }
}

/// The public base must end with a slash so that `Url::join` appends rather
/// than replaces the last path segment.
fn parse_public_base(raw: &str) -> Result<Url, AppError> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}
