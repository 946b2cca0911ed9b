//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Apply the registry's facet rules to the default LDAP configuration
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ConfigValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::registry::validation::validate_ldap_config;
use crate::registry::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("admin.api_key must not be empty when set")]
    EmptyApiKey,

    #[error("ldap: {0}")]
    Ldap(#[from] ValidationError),
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ConfigValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ConfigValidationError::ZeroRequestTimeout);
    }

    if config
        .admin
        .api_key
        .as_deref()
        .is_some_and(|key| key.trim().is_empty())
    {
        errors.push(ConfigValidationError::EmptyApiKey);
    }

    if let Err(ldap_errors) = validate_ldap_config(&config.ldap) {
        errors.extend(ldap_errors.into_iter().map(ConfigValidationError::Ldap));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
