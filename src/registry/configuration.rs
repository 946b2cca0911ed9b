//! The in-memory LDAP configuration registry.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::registry::error::RegistryError;
use crate::registry::types::{Facet, LdapConfig, RolesMapping, SearchFilter};
use crate::registry::validation::{
    validate_dn_pattern, validate_group_search, validate_ldap_config, validate_permission,
    validate_role_name, validate_user_search,
};

/// One facet: lock-free snapshots for readers, a mutex serializing writers.
///
/// Writers clone the current value, modify the clone and publish it, so a
/// reader holds either the old or the new value, never a mix.
struct FacetCell<T> {
    value: ArcSwap<T>,
    write: Mutex<()>,
}

impl<T: Clone> FacetCell<T> {
    fn new(value: T) -> Self {
        Self {
            value: ArcSwap::from_pointee(value),
            write: Mutex::new(()),
        }
    }

    fn load(&self) -> Arc<T> {
        self.value.load_full()
    }

    /// Apply `f` to a copy of the value; publish it only if `f` succeeds.
    fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        // The mutex guards no data, so a poisoned lock is still usable.
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = T::clone(&self.value.load());
        let out = f(&mut next)?;
        self.value.store(Arc::new(next));
        Ok(out)
    }

    fn replace(&self, value: T) {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        self.value.store(Arc::new(value));
    }
}

/// Connection settings; loaded from the store, not mutable over HTTP.
#[derive(Clone)]
struct Connection {
    url: String,
    manager_dn: Option<String>,
    manager_password: Option<String>,
}

/// Holds the four configuration facets and enforces their conflict rules.
///
/// # Concurrency
/// Each facet is its own mutual-exclusion domain. Of two concurrent
/// insert-only adds (or deletes) of the same key exactly one succeeds.
///
/// # Side effects
/// None. Persisting and reloading authenticators is the caller's job
/// (see `LdapConfigService`).
pub struct ConfigurationRegistry {
    connection: FacetCell<Connection>,
    roles_mapping: FacetCell<RolesMapping>,
    user_dn_patterns: FacetCell<Vec<String>>,
    user_search: FacetCell<SearchFilter>,
    group_search: FacetCell<SearchFilter>,
}

impl ConfigurationRegistry {
    /// Build a registry from a persisted configuration.
    ///
    /// Fails with the first validation error if `config` is malformed.
    pub fn from_config(config: LdapConfig) -> Result<Self, RegistryError> {
        if let Err(mut errors) = validate_ldap_config(&config) {
            return Err(errors.swap_remove(0).into());
        }

        Ok(Self {
            connection: FacetCell::new(Connection {
                url: config.url,
                manager_dn: config.manager_dn,
                manager_password: config.manager_password,
            }),
            roles_mapping: FacetCell::new(config.roles_mapping),
            user_dn_patterns: FacetCell::new(config.user_dn_patterns),
            user_search: FacetCell::new(config.user_search),
            group_search: FacetCell::new(config.group_search),
        })
    }

    /// Replace every facet with the contents of `config`.
    ///
    /// Nothing is changed if `config` is malformed.
    pub fn replace(&self, config: LdapConfig) -> Result<(), RegistryError> {
        if let Err(mut errors) = validate_ldap_config(&config) {
            return Err(errors.swap_remove(0).into());
        }

        self.connection.replace(Connection {
            url: config.url,
            manager_dn: config.manager_dn,
            manager_password: config.manager_password,
        });
        self.roles_mapping.replace(config.roles_mapping);
        self.user_dn_patterns.replace(config.user_dn_patterns);
        self.user_search.replace(config.user_search);
        self.group_search.replace(config.group_search);
        Ok(())
    }

    /// Copy of the whole configuration.
    pub fn snapshot(&self) -> LdapConfig {
        let connection = self.connection.load();
        LdapConfig {
            url: connection.url.clone(),
            manager_dn: connection.manager_dn.clone(),
            manager_password: connection.manager_password.clone(),
            user_dn_patterns: self.user_dn_patterns().as_ref().clone(),
            roles_mapping: self.roles_mapping().as_ref().clone(),
            user_search: self.user_search_filter().as_ref().clone(),
            group_search: self.group_search_filter().as_ref().clone(),
        }
    }

    // ---- roles mapping ----

    pub fn roles_mapping(&self) -> Arc<RolesMapping> {
        self.roles_mapping.load()
    }

    /// Insert or replace the permission for `role`.
    ///
    /// Returns the permission that was replaced, if any.
    pub fn upsert_role_mapping(
        &self,
        role: &str,
        permission: &str,
    ) -> Result<Option<String>, RegistryError> {
        validate_role_name(role)?;
        validate_permission(permission)?;

        self.roles_mapping
            .try_update(|roles| Ok(roles.insert(role.to_string(), permission.to_string())))
    }

    /// Insert `role -> permission` only if `role` is not mapped yet.
    pub fn insert_role_mapping_if_absent(
        &self,
        role: &str,
        permission: &str,
    ) -> Result<(), RegistryError> {
        validate_role_name(role)?;
        validate_permission(permission)?;

        self.roles_mapping.try_update(|roles| {
            if roles.contains_key(role) {
                return Err(RegistryError::Conflict {
                    facet: Facet::RolesMapping,
                    key: role.to_string(),
                });
            }
            roles.insert(role.to_string(), permission.to_string());
            Ok(())
        })
    }

    /// Remove `role`, returning the permission it was mapped to.
    pub fn delete_role_mapping(&self, role: &str) -> Result<String, RegistryError> {
        self.roles_mapping.try_update(|roles| {
            roles.remove(role).ok_or_else(|| RegistryError::NotFound {
                facet: Facet::RolesMapping,
                key: role.to_string(),
            })
        })
    }

    // ---- user DN patterns ----

    pub fn user_dn_patterns(&self) -> Arc<Vec<String>> {
        self.user_dn_patterns.load()
    }

    /// Append `pattern`. Duplicates are allowed.
    pub fn add_user_dn_pattern(&self, pattern: &str) -> Result<(), RegistryError> {
        validate_dn_pattern(pattern)?;

        self.user_dn_patterns.try_update(|patterns| {
            patterns.push(pattern.to_string());
            Ok(())
        })
    }

    /// Remove the first element equal to `pattern`.
    pub fn remove_user_dn_pattern(&self, pattern: &str) -> Result<(), RegistryError> {
        self.user_dn_patterns.try_update(|patterns| {
            let index = patterns
                .iter()
                .position(|p| p == pattern)
                .ok_or_else(|| RegistryError::NotFound {
                    facet: Facet::UserDnPatterns,
                    key: pattern.to_string(),
                })?;
            patterns.remove(index);
            Ok(())
        })
    }

    // ---- search filters ----

    pub fn user_search_filter(&self) -> Arc<SearchFilter> {
        self.user_search.load()
    }

    pub fn group_search_filter(&self) -> Arc<SearchFilter> {
        self.group_search.load()
    }

    pub fn set_user_search_filter(&self, base: &str, filter: &str) -> Result<(), RegistryError> {
        let search = SearchFilter::new(base, filter);
        validate_user_search(&search)?;
        self.user_search.replace(search);
        Ok(())
    }

    pub fn set_group_search_filter(&self, base: &str, filter: &str) -> Result<(), RegistryError> {
        let search = SearchFilter::new(base, filter);
        validate_group_search(&search)?;
        self.group_search.replace(search);
        Ok(())
    }
}
