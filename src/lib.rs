//! LDAP Configuration Registry Library

pub mod admin;
pub mod config;
pub mod http;
pub mod ldap;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod service;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{ConfigurationRegistry, LdapConfig};
pub use service::LdapConfigService;
