//! Persistence of the LDAP configuration.
//!
//! # Responsibilities
//! - Provide the initial configuration at startup
//! - Persist the registry snapshot after each successful mutation
//! - Expose the backing file (if any) so it can be watched for external edits
//!
//! # Design Decisions
//! - The store only sees whole snapshots, never individual facet changes
//! - File writes go to a sibling temp file and are renamed into place

pub mod file;
pub mod memory;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::registry::LdapConfig;

pub use file::TomlFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Backing storage for the LDAP configuration.
pub trait ConfigStore: Send + Sync {
    /// The persisted configuration, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<LdapConfig>, StoreError>;

    fn save(&self, config: &LdapConfig) -> Result<(), StoreError>;

    /// File backing this store, for change watching.
    fn location(&self) -> Option<&Path> {
        None
    }
}
