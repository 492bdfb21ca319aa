//! crates/novel_reader_core/src/language.rs
//!
//! The reader's interface language, persisted under the `language` key.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::Language;
use crate::ports::{KeyValueStorage, PortResult};
use crate::storage::LANGUAGE;

pub struct LanguagePreference {
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<Language>,
}

impl LanguagePreference {
    /// Loads the stored preference, falling back to `default` when nothing usable is stored.
    pub fn new(storage: Arc<dyn KeyValueStorage>, default: Language) -> Self {
        let stored = match storage.get(LANGUAGE) {
            Ok(Some(code)) => Language::from_code(&code).or_else(|| {
                warn!("Ignoring unknown stored language '{}'.", code);
                None
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                None
            }
        };

        let (state, _) = watch::channel(stored.unwrap_or(default));
        Self { storage, state }
    }

    pub fn current(&self) -> Language {
        *self.state.borrow()
    }

    pub fn set(&self, language: Language) -> PortResult<()> {
        self.storage.set(LANGUAGE, language.code())?;
        if self.state.send_replace(language) != language {
            info!("Interface language set to '{}'.", language.code());
        }
        Ok(())
    }

    /// Switches between Tamil and English and returns the new language.
    pub fn toggle(&self) -> PortResult<Language> {
        let next = self.current().other();
        self.set(next)?;
        Ok(next)
    }

    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn falls_back_to_default_on_garbage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(LANGUAGE, "klingon").unwrap();
        let preference = LanguagePreference::new(storage, Language::Tamil);
        assert_eq!(preference.current(), Language::Tamil);
    }

    #[test]
    fn toggle_persists_across_instances() {
        let storage = Arc::new(MemoryStorage::new());
        let preference = LanguagePreference::new(storage.clone(), Language::English);
        assert_eq!(preference.toggle().unwrap(), Language::Tamil);

        let reopened = LanguagePreference::new(storage, Language::English);
        assert_eq!(reopened.current(), Language::Tamil);
    }

    #[test]
    fn failed_write_keeps_current_language() {
        let storage = Arc::new(MemoryStorage::new());
        let preference = LanguagePreference::new(storage.clone(), Language::English);
        storage.fail_writes(true);
        assert!(preference.set(Language::Tamil).is_err());
        assert_eq!(preference.current(), Language::English);
    }
}
