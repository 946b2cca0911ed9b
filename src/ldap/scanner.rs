//! Reloading live authenticators after configuration changes.

use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ldap::authenticator::{LdapAuthenticator, ReloadError};
use crate::observability::metrics;
use crate::registry::LdapConfig;

/// Re-derives live authenticators from a configuration snapshot.
///
/// Called by the service layer after every successful mutation, never by
/// the registry itself.
pub trait ReloadNotifier: Send + Sync {
    fn reload(&self, config: &LdapConfig) -> Result<(), ReloadError>;
}

/// Holds the active `LdapAuthenticator`.
///
/// A reload compiles a new authenticator and swaps it in; requests already
/// holding the previous one finish with it. A failed reload keeps the
/// previous authenticator active.
#[derive(Default)]
pub struct AuthenticatorRegistry {
    current: ArcSwapOption<LdapAuthenticator>,
    generation: AtomicU64,
}

impl AuthenticatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active authenticator, if a reload has succeeded yet.
    pub fn current(&self) -> Option<Arc<LdapAuthenticator>> {
        self.current.load_full()
    }

    /// Number of successful reloads.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl ReloadNotifier for AuthenticatorRegistry {
    fn reload(&self, config: &LdapConfig) -> Result<(), ReloadError> {
        let authenticator = match LdapAuthenticator::from_config(config) {
            Ok(a) => a,
            Err(e) => {
                metrics::record_reload("failure");
                tracing::warn!(error = %e, "Authenticator reload rejected, keeping previous instance");
                return Err(e);
            }
        };

        self.current.store(Some(Arc::new(authenticator)));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        metrics::record_reload("success");
        tracing::info!(
            generation,
            url = %config.url,
            dn_patterns = config.user_dn_patterns.len(),
            roles = config.roles_mapping.len(),
            "Authenticators reloaded"
        );
        Ok(())
    }
}
