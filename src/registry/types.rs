//! Configuration facet types.
//!
//! These are the persisted shapes (TOML, snake_case). The HTTP representations
//! live in `admin::views`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Directory group name -> permission role (e.g. `Developers` -> `REPOSITORY_MANAGER`).
///
/// Sorted so snapshots serialize deterministically.
pub type RolesMapping = BTreeMap<String, String>;

/// The four mutable facets of the LDAP configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    RolesMapping,
    UserDnPatterns,
    UserSearchFilter,
    GroupSearchFilter,
}

impl Facet {
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::RolesMapping => "rolesMapping",
            Facet::UserDnPatterns => "userDnPatterns",
            Facet::UserSearchFilter => "userSearchFilter",
            Facet::GroupSearchFilter => "groupSearchFilter",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search scope plus the filter template applied within it.
///
/// Always replaced as a whole pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchFilter {
    pub search_base: String,
    pub search_filter: String,
}

impl SearchFilter {
    pub fn new(search_base: impl Into<String>, search_filter: impl Into<String>) -> Self {
        Self {
            search_base: search_base.into(),
            search_filter: search_filter.into(),
        }
    }
}

/// Complete LDAP authentication configuration as persisted.
///
/// Plain values come before tables so the struct serializes to valid TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LdapConfig {
    /// Directory URL, including the base DN (e.g. `ldap://host:389/dc=example,dc=com`).
    pub url: String,

    /// Bind DN for searches; anonymous when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_dn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_password: Option<String>,

    /// DN patterns tried in order when binding a user.
    pub user_dn_patterns: Vec<String>,

    pub roles_mapping: RolesMapping,

    pub user_search: SearchFilter,

    pub group_search: SearchFilter,
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            url: "ldap://localhost:389".to_string(),
            manager_dn: None,
            manager_password: None,
            user_dn_patterns: Vec::new(),
            roles_mapping: RolesMapping::new(),
            user_search: SearchFilter::new("ou=people", "(uid={0})"),
            group_search: SearchFilter::new("ou=groups", "(member={0})"),
        }
    }
}
