//! On-disk key-value store: one JSON document per key

use crate::errors::{PredictError, Result};
use crate::persistence::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// File envelope around a stored value
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    storage_dir: PathBuf,
}

impl JsonFileStore {
    /// Create store, creating the directory if it doesn't exist
    pub async fn new(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir).await?;
        Ok(Self { storage_dir })
    }

    /// Default location under the user's home directory
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".predictbuddy")
            .join("store")
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// File for `key`. ASCII letters, digits, `_` and `-` pass through;
    /// every other byte becomes `%XX`, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => {
                    file_name.push(char::from(byte))
                }
                _ => file_name.push_str(&format!("%{:02X}", byte)),
            }
        }
        self.storage_dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PredictError::transient("persistence", e)),
        };

        let envelope: Envelope = serde_json::from_str(&json)?;
        if envelope.expires_at.is_some_and(|at| Utc::now() >= at) {
            debug!(key, "stored value expired");
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl
            .and_then(|t| chrono::Duration::from_std(t).ok())
            .map(|t| Utc::now() + t);
        let json = serde_json::to_string_pretty(&Envelope { expires_at, value })?;

        // Write then rename so readers never see a partial document
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| PredictError::transient("persistence", e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| PredictError::transient("persistence", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("store")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let (store, _temp) = create_test_store().await;
        assert!(store.storage_dir().exists());
    }

    #[tokio::test]
    async fn test_save_and_load_value() {
        let (store, _temp) = create_test_store().await;
        store
            .set("predictive_patterns", json!([{"id": "p1"}]), None)
            .await
            .unwrap();

        let loaded = store.get("predictive_patterns").await.unwrap();
        assert_eq!(loaded, Some(json!([{"id": "p1"}])));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let (store, _temp) = create_test_store().await;
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_value() {
        let (store, _temp) = create_test_store().await;
        store.set("k", json!({"a": 1, "b": 2}), None).await.unwrap();
        store.set("k", json!({"a": 3}), None).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 3})));
    }

    #[tokio::test]
    async fn test_expired_value_reads_as_absent() {
        let (store, _temp) = create_test_store().await;
        store
            .set("k", json!(1), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_escaped() {
        let (store, _temp) = create_test_store().await;
        store.set("a/b:c", json!(true), None).await.unwrap();

        assert!(store.storage_dir().join("a%2Fb%3Ac.json").exists());
        assert_eq!(store.get("a/b:c").await.unwrap(), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_similar_keys_use_separate_files() {
        let (store, _temp) = create_test_store().await;
        store.set("a/b", json!(1), None).await.unwrap();
        store.set("a_b", json!(2), None).await.unwrap();
        store.set("a%2Fb", json!(3), None).await.unwrap();

        assert_eq!(store.get("a/b").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get("a_b").await.unwrap(), Some(json!(2)));
        assert_eq!(store.get("a%2Fb").await.unwrap(), Some(json!(3)));
    }
}
