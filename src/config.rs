//! Opaque key/value JSON persistence for batch definitions and CLI history.
//!
//! The teacher has no persistence layer of its own (`jan` is stateless
//! between runs); this is built from scratch using `serde`/`serde_json` (the
//! ecosystem's default) plus `dirs` for locating the platform config
//! directory, the way a small CLI tool in this corpus would.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A batch definition: one or more glob patterns searched under a common
/// root, with shared exclusions and interactive-prompt policy flags (see
/// spec's BatchProcessor).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    pub name: String,
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub exclusions: Vec<String>,
    pub skip_empty_patterns: bool,
    pub prompt_before_each_pattern: bool,
}

/// An entry in the "recently run batches" list, surfaced by the CLI so a
/// user can re-run without retyping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentBatch {
    pub name: String,
    pub config_path: PathBuf,
}

/// Free-text history the CLI offers back as defaults (last root searched,
/// last pattern typed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InputHistory {
    pub recent_roots: Vec<PathBuf>,
    pub recent_patterns: Vec<String>,
}

/// Key/value JSON store the CLI layer reads and writes through. Values are
/// opaque to the store itself — callers serialize their own types.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigError>;
    fn put(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigError>;
}

/// Persists the whole key/value map as one JSON object file, read fully on
/// first access and rewritten on every `put`. Fine for the handful of keys
/// (batch list, input history) this crate actually stores.
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Option<HashMap<String, serde_json::Value>>>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, cache: Mutex::new(None) }
    }

    /// `$XDG_CONFIG_HOME/blastmerge/config.json` (or platform equivalent via
    /// `dirs::config_dir`), if a config directory can be determined.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blastmerge").join("config.json"))
    }

    fn load(&self) -> Result<HashMap<String, serde_json::Value>, ConfigError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|cause| ConfigError::ReadFailed { path: self.path.clone(), cause })?;
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&text).map_err(|cause| ConfigError::Malformed { path: self.path.clone(), cause })
    }

    fn save(&self, map: &HashMap<String, serde_json::Value>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let text = serde_json::to_string_pretty(map)
            .map_err(|cause| ConfigError::Malformed { path: self.path.clone(), cause })?;
        fs::write(&self.path, text).map_err(|cause| ConfigError::WriteFailed { path: self.path.clone(), cause })
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigError> {
        let mut guard = self.cache.lock().expect("config cache mutex poisoned");
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        Ok(guard.as_ref().expect("just populated").get(key).cloned())
    }

    fn put(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigError> {
        let mut guard = self.cache.lock().expect("config cache mutex poisoned");
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        let map = guard.as_mut().expect("just populated");
        map.insert(key.to_string(), value);
        self.save(map)
    }
}

/// Read-and-deserialize convenience over a raw [`ConfigStore`].
pub fn read_batches(store: &dyn ConfigStore) -> Result<Vec<BatchConfig>, ConfigError> {
    match store.get("batches")? {
        Some(value) => {
            let path = Path::new("<config>").to_path_buf();
            serde_json::from_value(value).map_err(|cause| ConfigError::Malformed { path, cause })
        },
        None => Ok(Vec::new()),
    }
}

pub fn write_batches(store: &dyn ConfigStore, batches: &[BatchConfig]) -> Result<(), ConfigError> {
    let value = serde_json::to_value(batches)
        .map_err(|cause| ConfigError::Malformed { path: Path::new("<config>").to_path_buf(), cause })?;
    store.put("batches", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("config.json"));
        store.put("history", serde_json::json!({"recent_roots": ["/tmp"]})).unwrap();
        let value = store.get("history").unwrap().unwrap();
        assert_eq!(value["recent_roots"][0], "/tmp");
    }

    #[test]
    fn get_on_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nonexistent.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn persists_across_store_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        JsonFileStore::new(path.clone()).put("k", serde_json::json!(1)).unwrap();
        let reloaded = JsonFileStore::new(path);
        assert_eq!(reloaded.get("k").unwrap(), Some(serde_json::json!(1)));
    }

    #[test]
    fn read_write_batches_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("config.json"));
        let batches = vec![BatchConfig {
            name: "configs".into(),
            root: PathBuf::from("/repo"),
            patterns: vec!["*.toml".into()],
            exclusions: vec![],
            skip_empty_patterns: true,
            prompt_before_each_pattern: false,
        }];
        write_batches(&store, &batches).unwrap();
        assert_eq!(read_batches(&store).unwrap(), batches);
    }
}
