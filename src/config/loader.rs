//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ConfigValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ConfigValidationError>),
}

fn join(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "0.0.0.0:48080"

            [admin]
            api_key = "secret"

            [store]
            path = "/var/lib/ldap-config/ldap.toml"
            watch = false

            [ldap]
            url = "ldap://127.0.0.1:33389/dc=carlspring,dc=com"
            user_dn_patterns = ["uid={0},ou=Users"]

            [ldap.roles_mapping]
            Developers = "REPOSITORY_MANAGER"
            Contributors = "USER_ROLE"

            [ldap.user_search]
            search_base = "ou=people"
            search_filter = "(uid={0})"

            [ldap.group_search]
            search_base = "ou=Groups"
            search_filter = "(uniqueMember={0})"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:48080");
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
        assert!(!config.store.watch);
        assert_eq!(config.ldap.roles_mapping["Contributors"], "USER_ROLE");
        assert_eq!(config.ldap.group_search.search_filter, "(uniqueMember={0})");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_bundled_sample_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/ldap-config-registry.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.ldap.user_dn_patterns, vec!["uid={0},ou=Users"]);
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.store.path.is_none());
        assert!(config.ldap.user_dn_patterns.is_empty());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = parse_config(
            r#"
            [ldap]
            user_dn_patterns = ["uid={0},ou=Users", "uid={1}"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: ldap: user DN pattern"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
    }
}
