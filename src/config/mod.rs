//! Service configuration subsystem.
//!
//! # Data Flow
//! ```text
//! service config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! LDAP store file edited externally:
//!     watcher.rs detects change
//!     → TomlFileStore loads new LdapConfig
//!     → sent to the server loop
//!     → LdapConfigService::apply_external (validate, swap, reload)
//! ```
//!
//! # Design Decisions
//! - Service settings are immutable once loaded; only the LDAP facets change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, ListenerConfig, ObservabilityConfig, ServiceConfig, StoreConfig, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
