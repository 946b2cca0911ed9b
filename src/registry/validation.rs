//! Facet-specific input validation.
//!
//! # Rules
//! - Names, permissions, patterns, bases and filters are non-empty after trimming
//! - Permissions are upper-case identifiers (`[A-Z][A-Z0-9_]*`)
//! - DN patterns and filters are well-formed templates for their arity
//! - Filters are a single parenthesised expression
//!
//! Whole-config validation collects every error instead of stopping at the first.

use crate::ldap::template::{
    check_filter_syntax, Template, TemplateError, DN_PATTERN_ARITY, GROUP_SEARCH_ARITY,
    USER_SEARCH_ARITY,
};
use crate::registry::error::ValidationError;
use crate::registry::types::{LdapConfig, SearchFilter};

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

pub fn validate_role_name(role: &str) -> Result<(), ValidationError> {
    non_empty("role", role)
}

pub fn validate_permission(permission: &str) -> Result<(), ValidationError> {
    non_empty("permission", permission)?;

    let mut chars = permission.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    let rest_ok = chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if !starts_with_letter || !rest_ok {
        return Err(ValidationError::InvalidPermission(permission.to_string()));
    }
    Ok(())
}

pub fn validate_dn_pattern(pattern: &str) -> Result<(), ValidationError> {
    non_empty("user DN pattern", pattern)?;
    Template::parse(pattern, DN_PATTERN_ARITY).map_err(|source| ValidationError::Template {
        field: "user DN pattern",
        value: pattern.to_string(),
        source,
    })?;
    Ok(())
}

fn validate_search(
    field: &'static str,
    search: &SearchFilter,
    arity: usize,
) -> Result<(), ValidationError> {
    non_empty("search base", &search.search_base)?;
    non_empty("search filter", &search.search_filter)?;

    let filter = &search.search_filter;
    let malformed = |source: TemplateError| ValidationError::Template {
        field,
        value: filter.clone(),
        source,
    };
    check_filter_syntax(filter).map_err(malformed)?;
    Template::parse(filter, arity).map_err(malformed)?;
    Ok(())
}

pub fn validate_user_search(search: &SearchFilter) -> Result<(), ValidationError> {
    validate_search("user search filter", search, USER_SEARCH_ARITY)
}

pub fn validate_group_search(search: &SearchFilter) -> Result<(), ValidationError> {
    validate_search("group search filter", search, GROUP_SEARCH_ARITY)
}

/// Validate every facet of `config`, returning all errors found.
pub fn validate_ldap_config(config: &LdapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = non_empty("url", &config.url) {
        errors.push(e);
    }
    for (role, permission) in &config.roles_mapping {
        if let Err(e) = validate_role_name(role).and_then(|_| validate_permission(permission)) {
            errors.push(e);
        }
    }
    for pattern in &config.user_dn_patterns {
        if let Err(e) = validate_dn_pattern(pattern) {
            errors.push(e);
        }
    }
    if let Err(e) = validate_user_search(&config.user_search) {
        errors.push(e);
    }
    if let Err(e) = validate_group_search(&config.group_search) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
