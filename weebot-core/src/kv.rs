//! Key-value persistence substrate for the session log.
//!
//! Values are opaque strings (the store writes JSON). Two backends:
//! - **File** — one `<key>.json` file per key under a data directory
//! - **Memory** — process-local map, for tests and throwaway contexts

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::WeebotError;

/// A single-namespace string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, WeebotError>;

    /// Replaces the whole value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), WeebotError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// FileKeyValueStore
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create the store, creating `dir` if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, WeebotError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, WeebotError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(WeebotError::Storage(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, WeebotError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WeebotError> {
        let path = self.path_for(key)?;
        // Write-then-rename so readers never observe a half-written blob
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// MemoryKeyValueStore
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, WeebotError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| WeebotError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WeebotError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| WeebotError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
