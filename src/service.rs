//! Service layer owning the registry and its collaborators.
//!
//! # Data Flow
//! ```text
//! mutation request
//!     → commit lock
//!     → ConfigurationRegistry (validate + apply; no I/O)
//!     → snapshot → ConfigStore::save → ReloadNotifier::reload
//! ```
//!
//! # Design Decisions
//! - A mutation and its commit run under one lock, so an external edit can
//!   never land between them
//! - The lock remembers the configuration last known to be in the store;
//!   change events carrying it, or superseded by a newer save, are ignored
//! - A failed save still reloads authenticators; memory is authoritative

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::ldap::{ReloadError, ReloadNotifier};
use crate::observability::metrics;
use crate::registry::{
    ConfigurationRegistry, Facet, LdapConfig, RegistryError, RolesMapping, SearchFilter,
};
use crate::store::{ConfigStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("configuration changed but could not be persisted: {0}")]
    Store(#[from] StoreError),

    #[error("configuration changed but authenticators could not be reloaded: {0}")]
    Reload(#[from] ReloadError),

    #[error("configuration task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct LdapConfigService {
    registry: ConfigurationRegistry,
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn ReloadNotifier>,
    /// Last configuration written to (or read from) the store.
    persisted: Mutex<Option<LdapConfig>>,
}

impl LdapConfigService {
    /// Load the persisted configuration (or `defaults` if none was saved yet),
    /// build the registry and perform the initial authenticator reload.
    pub fn bootstrap(
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn ReloadNotifier>,
        defaults: LdapConfig,
    ) -> Result<Self, ServiceError> {
        let stored = store.load()?;
        let config = stored.clone().unwrap_or(defaults);

        let registry = ConfigurationRegistry::from_config(config)?;
        let from_store = stored.is_some();
        let service = Self {
            registry,
            store,
            notifier,
            persisted: Mutex::new(stored),
        };

        if from_store {
            tracing::info!("LDAP configuration loaded from store");
            service.notifier.reload(&service.registry.snapshot())?;
        } else {
            tracing::info!("No persisted LDAP configuration, using defaults");
            let mut persisted = service.lock_persisted();
            service.commit(&mut persisted)?;
        }
        Ok(service)
    }

    pub fn registry(&self) -> &ConfigurationRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> LdapConfig {
        self.registry.snapshot()
    }

    fn lock_persisted(&self) -> MutexGuard<'_, Option<LdapConfig>> {
        self.persisted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Save and reload the current state. Callers hold the commit lock.
    fn commit(&self, persisted: &mut Option<LdapConfig>) -> Result<(), ServiceError> {
        let snapshot = self.registry.snapshot();

        let saved = self.store.save(&snapshot);
        if let Err(e) = &saved {
            tracing::error!(error = %e, "Failed to persist LDAP configuration");
        }
        let reloaded = self.notifier.reload(&snapshot);
        if let Err(e) = &reloaded {
            tracing::error!(error = %e, "Failed to reload authenticators");
        }

        if saved.is_ok() {
            *persisted = Some(snapshot);
        }
        saved?;
        reloaded?;
        Ok(())
    }

    /// Apply a registry operation and commit it, recording the outcome.
    fn mutate<T>(
        &self,
        facet: Facet,
        op: &'static str,
        key: &str,
        apply: impl FnOnce(&ConfigurationRegistry) -> Result<T, RegistryError>,
    ) -> Result<T, ServiceError> {
        let mut persisted = self.lock_persisted();
        match apply(&self.registry) {
            Ok(value) => {
                metrics::record_mutation(facet, op, "ok");
                tracing::info!(facet = %facet, op, key, "LDAP configuration updated");
                self.commit(&mut persisted)?;
                Ok(value)
            }
            Err(e) => {
                let outcome = match e {
                    RegistryError::Conflict { .. } => "conflict",
                    RegistryError::NotFound { .. } => "not_found",
                    RegistryError::Validation(_) => "invalid",
                };
                metrics::record_mutation(facet, op, outcome);
                tracing::debug!(facet = %facet, op, key, error = %e, "LDAP configuration change rejected");
                Err(e.into())
            }
        }
    }

    // ---- reads ----

    pub fn roles_mapping(&self) -> Arc<RolesMapping> {
        self.registry.roles_mapping()
    }

    pub fn user_dn_patterns(&self) -> Arc<Vec<String>> {
        self.registry.user_dn_patterns()
    }

    pub fn user_search_filter(&self) -> Arc<SearchFilter> {
        self.registry.user_search_filter()
    }

    pub fn group_search_filter(&self) -> Arc<SearchFilter> {
        self.registry.group_search_filter()
    }

    // ---- mutations ----

    pub fn upsert_role_mapping(&self, role: &str, permission: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::RolesMapping, "upsert", role, |r| {
            r.upsert_role_mapping(role, permission).map(|_| ())
        })
    }

    pub fn insert_role_mapping_if_absent(
        &self,
        role: &str,
        permission: &str,
    ) -> Result<(), ServiceError> {
        self.mutate(Facet::RolesMapping, "insert", role, |r| {
            r.insert_role_mapping_if_absent(role, permission)
        })
    }

    pub fn delete_role_mapping(&self, role: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::RolesMapping, "delete", role, |r| {
            r.delete_role_mapping(role).map(|_| ())
        })
    }

    pub fn add_user_dn_pattern(&self, pattern: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::UserDnPatterns, "insert", pattern, |r| {
            r.add_user_dn_pattern(pattern)
        })
    }

    pub fn remove_user_dn_pattern(&self, pattern: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::UserDnPatterns, "delete", pattern, |r| {
            r.remove_user_dn_pattern(pattern)
        })
    }

    pub fn set_user_search_filter(&self, base: &str, filter: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::UserSearchFilter, "replace", filter, |r| {
            r.set_user_search_filter(base, filter)
        })
    }

    pub fn set_group_search_filter(&self, base: &str, filter: &str) -> Result<(), ServiceError> {
        self.mutate(Facet::GroupSearchFilter, "replace", filter, |r| {
            r.set_group_search_filter(base, filter)
        })
    }

    /// Apply a configuration edited outside the service (store file change).
    ///
    /// Returns `false` without touching the registry when `config` is what the
    /// service itself last saved, equals the current state, or is no longer
    /// what the store holds (a newer save superseded the event).
    pub fn apply_external(&self, config: LdapConfig) -> Result<bool, ServiceError> {
        let mut persisted = self.lock_persisted();
        if persisted.as_ref() == Some(&config) {
            return Ok(false);
        }
        if config == self.registry.snapshot() {
            *persisted = Some(config);
            return Ok(false);
        }
        if self.store.load()?.as_ref() != Some(&config) {
            tracing::debug!("Ignoring superseded LDAP store change event");
            return Ok(false);
        }

        self.registry.replace(config.clone())?;
        *persisted = Some(config);
        self.notifier.reload(&self.registry.snapshot())?;
        tracing::info!("External LDAP configuration change applied");
        Ok(true)
    }
}
