//! LDAP configuration registry.
//!
//! # Data Flow
//! ```text
//! ConfigStore::load (startup)
//!     → validation.rs (facet rules)
//!     → ConfigurationRegistry (four facets, each an ArcSwap + writer mutex)
//!
//! HTTP mutation
//!     → LdapConfigService
//!     → ConfigurationRegistry operation (Conflict / NotFound / Validation)
//!     → on success: snapshot → persist → reload authenticators
//! ```
//!
//! # Verb semantics
//! - upsert (PUT): always succeeds for valid input
//! - insert-only (POST): `Conflict` if the role is already mapped
//! - delete (DELETE): `NotFound` if the role / pattern is absent

pub mod configuration;
pub mod error;
pub mod types;
pub mod validation;

pub use configuration::ConfigurationRegistry;
pub use error::{RegistryError, ValidationError};
pub use types::{Facet, LdapConfig, RolesMapping, SearchFilter};
