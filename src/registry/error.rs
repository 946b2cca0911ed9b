//! Registry outcomes that are part of the normal contract.

use thiserror::Error;

use crate::ldap::template::TemplateError;
use crate::registry::types::Facet;

/// A rejected registry operation.
///
/// None of these are transient: retrying the same call yields the same result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Insert-only operation on a key that already exists.
    #[error("{facet} already contains '{key}'")]
    Conflict { facet: Facet, key: String },

    /// Delete-style operation on a key or element that is absent.
    #[error("{facet} does not contain '{key}'")]
    NotFound { facet: Facet, key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RegistryError {
    pub fn facet(&self) -> Option<Facet> {
        match self {
            RegistryError::Conflict { facet, .. } | RegistryError::NotFound { facet, .. } => {
                Some(*facet)
            }
            RegistryError::Validation(_) => None,
        }
    }
}

/// Malformed input for one of the facets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("permission '{0}' must be an upper-case identifier such as REPOSITORY_MANAGER")]
    InvalidPermission(String),

    #[error("{field} '{value}' is malformed: {source}")]
    Template {
        field: &'static str,
        value: String,
        source: TemplateError,
    },
}
