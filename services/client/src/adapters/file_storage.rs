//! services/client/src/adapters/file_storage.rs
//!
//! A `KeyValueStorage` adapter backed by a single JSON object on disk.
//! The whole map is held in memory and written through on every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use novel_reader_core::ports::{KeyValueStorage, PortError, PortResult};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`. The file is created on the first write.
    /// A file that cannot be parsed is treated as empty and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();
        let entries = Self::load(&path)?;
        debug!("Opened storage at {} ({} keys).", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> PortResult<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| PortError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Ignoring unreadable storage file {}: {}", path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PortError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Serialization(e.to_string()))?;

        // Staged write and rename; the file is never left half-written.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content)
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|e| {
                PortError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save(&entries) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.lock();
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.save(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
