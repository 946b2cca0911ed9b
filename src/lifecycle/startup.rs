//! Startup orchestration.
//!
//! # Responsibilities
//! - Select the configuration store
//! - Bootstrap the registry and perform the initial authenticator reload
//! - Start watching the store file for external edits
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use notify::RecommendedWatcher;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::{ConfigWatcher, ServiceConfig};
use crate::ldap::AuthenticatorRegistry;
use crate::registry::LdapConfig;
use crate::service::{LdapConfigService, ServiceError};
use crate::store::{ConfigStore, MemoryStore, TomlFileStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bootstrap LDAP configuration: {0}")]
    Bootstrap(#[from] ServiceError),

    #[error("failed to watch LDAP store file: {0}")]
    Watch(#[from] notify::Error),
}

/// Everything the server needs once startup has completed.
pub struct Runtime {
    pub service: Arc<LdapConfigService>,
    pub authenticators: Arc<AuthenticatorRegistry>,
    /// Externally edited configurations; already closed when nothing is watched.
    pub config_updates: mpsc::UnboundedReceiver<LdapConfig>,
    /// Keeps the file watcher alive; dropping it stops watching.
    pub watcher: Option<RecommendedWatcher>,
}

/// Build the store, registry and authenticators described by `config`.
pub fn bootstrap(config: &ServiceConfig) -> Result<Runtime, StartupError> {
    let store: Arc<dyn ConfigStore> = match &config.store.path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file-backed LDAP configuration store");
            Arc::new(TomlFileStore::new(path))
        }
        None => {
            tracing::warn!("No store path configured; LDAP configuration is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let authenticators = Arc::new(AuthenticatorRegistry::new());
    let service = LdapConfigService::bootstrap(
        store.clone(),
        authenticators.clone(),
        config.ldap.clone(),
    )?;

    let (watcher, config_updates) = match store.location() {
        Some(path) if config.store.watch => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        _ => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    tracing::info!(
        generation = authenticators.generation(),
        "LDAP configuration ready"
    );

    Ok(Runtime {
        service: Arc::new(service),
        authenticators,
        config_updates,
        watcher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_in_memory_uses_configured_defaults() {
        let mut config = ServiceConfig::default();
        config
            .ldap
            .roles_mapping
            .insert("Developers".into(), "REPOSITORY_MANAGER".into());

        let runtime = bootstrap(&config).unwrap();
        assert!(runtime.watcher.is_none());
        assert_eq!(runtime.authenticators.generation(), 1);
        assert_eq!(
            runtime.service.roles_mapping().get("Developers").map(String::as_str),
            Some("REPOSITORY_MANAGER")
        );
    }

    #[test]
    fn test_bootstrap_with_file_store_persists_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ldap.toml");
        let mut config = ServiceConfig::default();
        config.store.path = Some(path.clone());
        config.store.watch = false;

        let runtime = bootstrap(&config).unwrap();
        assert!(runtime.watcher.is_none());
        assert!(path.exists());
    }
}
