//! In-memory store: not durable, used when no store file is configured and in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::registry::LdapConfig;
use crate::store::{ConfigStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<LdapConfig>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `config`.
    pub fn with_config(config: LdapConfig) -> Self {
        Self {
            saved: Mutex::new(Some(config)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<LdapConfig>, StoreError> {
        Ok(self
            .saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, config: &LdapConfig) -> Result<(), StoreError> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
