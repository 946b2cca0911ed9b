//! Authenticator compiled from an LDAP configuration snapshot.
//!
//! This is the view the authentication path works with: templates are
//! parsed once and rendered per login. Binding to and searching the
//! directory is done by the LDAP client, which lives outside this crate.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::ldap::template::{
    escape_dn_value, escape_filter_value, Template, TemplateError, DN_PATTERN_ARITY,
    GROUP_SEARCH_ARITY, USER_SEARCH_ARITY,
};
use crate::registry::{LdapConfig, RolesMapping, SearchFilter};

/// Failure to derive an authenticator from a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReloadError {
    #[error("invalid {what} '{value}': {source}")]
    Template {
        what: &'static str,
        value: String,
        source: TemplateError,
    },
}

/// A search request ready to send to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: String,
    pub filter: String,
}

#[derive(Debug, Clone)]
struct CompiledSearch {
    base: String,
    filter: Template,
}

impl CompiledSearch {
    fn compile(what: &'static str, search: &SearchFilter, arity: usize) -> Result<Self, ReloadError> {
        let filter =
            Template::parse(&search.search_filter, arity).map_err(|source| ReloadError::Template {
                what,
                value: search.search_filter.clone(),
                source,
            })?;
        Ok(Self {
            base: search.search_base.clone(),
            filter,
        })
    }

    fn request(&self, args: &[&str]) -> SearchRequest {
        SearchRequest {
            base: self.base.clone(),
            filter: self.filter.render(args, escape_filter_value),
        }
    }
}

/// Live authenticator settings derived from one configuration snapshot.
#[derive(Debug, Clone)]
pub struct LdapAuthenticator {
    url: String,
    manager_dn: Option<String>,
    dn_patterns: Vec<Template>,
    user_search: CompiledSearch,
    group_search: CompiledSearch,
    roles: RolesMapping,
}

impl LdapAuthenticator {
    pub fn from_config(config: &LdapConfig) -> Result<Self, ReloadError> {
        let dn_patterns = config
            .user_dn_patterns
            .iter()
            .map(|pattern| {
                Template::parse(pattern, DN_PATTERN_ARITY).map_err(|source| ReloadError::Template {
                    what: "user DN pattern",
                    value: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            url: config.url.clone(),
            manager_dn: config.manager_dn.clone(),
            dn_patterns,
            user_search: CompiledSearch::compile(
                "user search filter",
                &config.user_search,
                USER_SEARCH_ARITY,
            )?,
            group_search: CompiledSearch::compile(
                "group search filter",
                &config.group_search,
                GROUP_SEARCH_ARITY,
            )?,
            roles: config.roles_mapping.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn manager_dn(&self) -> Option<&str> {
        self.manager_dn.as_deref()
    }

    /// DNs to try binding `login` with, in pattern order.
    pub fn candidate_dns(&self, login: &str) -> Vec<String> {
        self.dn_patterns
            .iter()
            .map(|pattern| pattern.render(&[login], escape_dn_value))
            .collect()
    }

    /// Search used to locate `login` when no DN pattern binds.
    pub fn user_search(&self, login: &str) -> SearchRequest {
        self.user_search.request(&[login])
    }

    /// Search listing the groups of an authenticated user.
    pub fn group_search(&self, user_dn: &str, login: &str) -> SearchRequest {
        self.group_search.request(&[user_dn, login])
    }

    /// Permissions granted by membership in `groups`; unmapped groups are ignored.
    pub fn map_authorities<'a>(&self, groups: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        groups
            .into_iter()
            .filter_map(|group| self.roles.get(group).cloned())
            .collect()
    }
}
