//! # Session Storage
//!
//! Backends for the session-scoped `synced-{wallet}` flags.
//!
//! - [`MemorySessionStore`]: lives as long as the process (one "tab")
//! - [`FileSessionStore`]: JSON file shared by processes of the same session, so
//!   a restart ("page reload") does not re-trigger sync

use crate::core::error::{AppError, Result};
use crate::core::service::SessionStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage key of the persisted sync flag for `wallet`.
pub fn sync_flag_key(wallet: &str) -> String {
    format!("synced-{}", wallet)
}

/// In-memory session storage.
#[derive(Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Session storage persisted as a flat JSON object.
///
/// The whole map is loaded on open and rewritten on every change.
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Open (or lazily create) the store at `path`. A missing file is an empty session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    AppError::Storage(format!("Corrupt session file {}: {}", path.display(), e))
                })?
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Session store opened");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_flag_key_format() {
        assert_eq!(sync_flag_key("abc"), "synced-abc");
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("synced-a"), None);
        store.set("synced-a", "true").unwrap();
        assert_eq!(store.get("synced-a").as_deref(), Some("true"));
        store.remove("synced-a").unwrap();
        assert_eq!(store.get("synced-a"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("flags.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set(&sync_flag_key("wallet-a"), "true").unwrap();
        drop(store);

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get("synced-wallet-a").as_deref(), Some("true"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileSessionStore::open(&path), Err(AppError::Storage(_))));
    }
}
