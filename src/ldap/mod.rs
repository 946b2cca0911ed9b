//! LDAP authenticator support.
//!
//! # Data Flow
//! ```text
//! LdapConfig snapshot
//!     → scanner.rs (ReloadNotifier: compile + atomic swap)
//!     → authenticator.rs (LdapAuthenticator: DN candidates, searches, role mapping)
//!     → template.rs (placeholder parsing, RFC 4514 / 4515 escaping)
//! ```

pub mod authenticator;
pub mod scanner;
pub mod template;

pub use authenticator::{LdapAuthenticator, ReloadError, SearchRequest};
pub use scanner::{AuthenticatorRegistry, ReloadNotifier};
