use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cloned or stock voice usable for audio generation.
///
/// Cloned voices are produced by a successful voice-clone job and are
/// read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceAsset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source_audio_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl VoiceAsset {
    /// Build an asset from the result body of a completed voice-clone job.
    /// The upstream reports the voice identifier as either `voice_id` or `id`.
    pub fn from_clone_result(
        result: &Value,
        fallback_id: &str,
        name: &str,
        source_audio_url: &str,
    ) -> Self {
        let id = result
            .get("voice_id")
            .or_else(|| result.get("id"))
            .and_then(Value::as_str)
            .unwrap_or(fallback_id)
            .to_string();
        let preview_url = result
            .get("preview_url")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            id,
            name: name.to_string(),
            source_audio_url: Some(source_audio_url.to_string()),
            preview_url,
        }
    }
}

/// Session-scoped collection of voices. Entries are unique by id and keep
/// insertion (discovery) order.
#[derive(Debug, Default)]
pub struct VoiceLibrary {
    assets: Vec<VoiceAsset>,
}

impl VoiceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset, returning false when the id is already present.
    pub fn insert(&mut self, asset: VoiceAsset) -> bool {
        if self.contains(&asset.id) {
            return false;
        }
        self.assets.push(asset);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.assets.iter().any(|asset| asset.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&VoiceAsset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(id: &str, name: &str) -> VoiceAsset {
        VoiceAsset {
            id: id.to_string(),
            name: name.to_string(),
            source_audio_url: None,
            preview_url: None,
        }
    }

    #[test]
    fn test_insert_keeps_discovery_order() {
        let mut library = VoiceLibrary::new();
        assert!(library.insert(asset("v2", "Second")));
        assert!(library.insert(asset("v1", "First")));
        assert!(library.insert(asset("v3", "Third")));

        let ids: Vec<&str> = library.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1", "v3"]);
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut library = VoiceLibrary::new();
        assert!(library.insert(asset("v1", "Original")));
        assert!(!library.insert(asset("v1", "Impostor")));

        assert_eq!(library.len(), 1);
        assert_eq!(library.get("v1").map(|a| a.name.as_str()), Some("Original"));
    }

    #[test]
    fn test_from_clone_result_prefers_upstream_voice_id() {
        let result = json!({ "voice_id": "voice-9", "preview_url": "https://cdn/preview.mp3" });
        let asset =
            VoiceAsset::from_clone_result(&result, "job-1", "My Voice", "https://media/clip.mp3");

        assert_eq!(asset.id, "voice-9");
        assert_eq!(asset.preview_url.as_deref(), Some("https://cdn/preview.mp3"));
        assert_eq!(
            asset.source_audio_url.as_deref(),
            Some("https://media/clip.mp3")
        );
    }

    #[test]
    fn test_from_clone_result_falls_back_to_job_id() {
        let asset = VoiceAsset::from_clone_result(&json!({}), "job-7", "Voice", "url");
        assert_eq!(asset.id, "job-7");
    }
}
