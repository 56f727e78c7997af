//! Key-value storage adapter.
//!
//! Implements [`KvPort`] for the settings store.
//!
//! - **file backend** — the whole map lives in one JSON file, rewritten via
//!   a temp file + rename so a crash mid-write leaves the old file intact.
//! - **in-memory backend** — same semantics without persistence, for tests
//!   and ephemeral runs.
//!
//! Keys are stored as `namespace::key` so subsystems cannot collide.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::{KvError, KvPort};

pub struct KvAdapter {
    store: HashMap<String, Vec<u8>>,
    path: Option<PathBuf>,
}

impl KvAdapter {
    /// Volatile store.
    pub fn in_memory() -> Self {
        info!("KvAdapter: in-memory backend");
        Self {
            store: HashMap::new(),
            path: None,
        }
    }

    /// Open (or lazily create) a file-backed store.
    ///
    /// Returns `Err(KvError::Corrupted)` if the file exists but is not a
    /// valid store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref().to_path_buf();
        let store = if path.exists() {
            let text =
                std::fs::read_to_string(&path).map_err(|e| KvError::IoError(e.to_string()))?;
            serde_json::from_str(&text).map_err(|_| KvError::Corrupted)?
        } else {
            HashMap::new()
        };
        info!("KvAdapter: file backend {} ({} keys)", path.display(), store.len());
        Ok(Self {
            store,
            path: Some(path),
        })
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Persist `next` and adopt it only once it is on disk.
    fn commit(&mut self, next: HashMap<String, Vec<u8>>) -> Result<(), KvError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_vec(&next).map_err(|e| KvError::IoError(e.to_string()))?;
            let tmp = path.with_extension("tmp");
            std::fs::write(&tmp, json).map_err(|e| KvError::IoError(e.to_string()))?;
            std::fs::rename(&tmp, path).map_err(|e| KvError::IoError(e.to_string()))?;
            debug!("KvAdapter: wrote {}", path.display());
        }
        self.store = next;
        Ok(())
    }
}

impl KvPort for KvAdapter {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, KvError> {
        self.store
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(KvError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), KvError> {
        let mut next = self.store.clone();
        next.insert(Self::composite_key(namespace, key), data.to_vec());
        self.commit(next)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), KvError> {
        let composite = Self::composite_key(namespace, key);
        if !self.store.contains_key(&composite) {
            return Ok(());
        }
        let mut next = self.store.clone();
        next.remove(&composite);
        self.commit(next)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&Self::composite_key(namespace, key))
    }
}
