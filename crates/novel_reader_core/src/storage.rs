//! crates/novel_reader_core/src/storage.rs
//!
//! Durable storage key names and an in-memory `KeyValueStorage` adapter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::ports::{KeyValueStorage, PortError, PortResult};

pub const AUTH_TOKEN: &str = "authToken";
pub const REFRESH_TOKEN: &str = "refreshToken";
pub const USER: &str = "user";
pub const LANGUAGE: &str = "language";
pub const ONGOING_NOVELS: &str = "ongoingNovels";
pub const COMPLETED_NOVELS: &str = "completedNovels";
pub const LIBRARY_BOOKMARKS: &str = "libraryBookmarks";

/// Reads a JSON value. Missing keys and unreadable payloads both yield `None`;
/// a corrupt entry is logged and treated as absent.
pub fn read_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read '{}' from storage: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt '{}' entry in storage: {}", key, e);
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| PortError::Serialization(e.to_string()))?;
    storage.set(key, &raw)
}

/// A process-lifetime store. Used by tests and by callers that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail, to exercise storage error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a consistent map of strings.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Storage("storage is read-only".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}
