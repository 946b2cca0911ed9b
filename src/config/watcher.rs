//! Store file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::registry::LdapConfig;
use crate::store::{ConfigStore, TomlFileStore};

/// A watcher that monitors the LDAP store file for external edits.
pub struct ConfigWatcher {
    store: TomlFileStore,
    update_tx: mpsc::UnboundedSender<LdapConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher for the store file at `path`.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LdapConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                store: TomlFileStore::new(path),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The parent directory is watched rather than the file itself, since
    /// saves replace the file by renaming over it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.store.path().to_path_buf();
        let directory = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(|n| n.to_os_string());
        let store = self.store;
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !relevant {
                        return;
                    }

                    match store.load() {
                        Ok(Some(config)) => {
                            tracing::debug!(path = %store.path().display(), "LDAP store file changed");
                            let _ = tx.send(config);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Failed to reload LDAP store file. Keeping current configuration."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "LDAP store watcher started");
        Ok(watcher)
    }
}
