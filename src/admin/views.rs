//! HTTP documents for the LDAP configuration endpoints.
//!
//! JSON and XML carry the same logical structure:
//! ```text
//! {"rolesMapping": {"Developers": "REPOSITORY_MANAGER"}}
//! <rolesMapping><role name="Developers">REPOSITORY_MANAGER</role></rolesMapping>
//!
//! {"userDnPattern": ["uid={0},ou=Users"]}
//! <userDnPatterns><userDnPattern>uid={0},ou=Users</userDnPattern></userDnPatterns>
//!
//! {"searchBase": "ou=people", "searchFilter": "(uid={0})"}
//! <searchFilterConfiguration><searchBase>ou=people</searchBase><searchFilter>(uid={0})</searchFilter></searchFilterConfiguration>
//! ```
//! Role names go in an attribute because they need not be valid element names.

use serde::Serialize;

use crate::http::response::Document;
use crate::registry::{RolesMapping, SearchFilter};

#[derive(Debug, Serialize)]
#[serde(rename = "rolesMapping")]
pub struct RolesMappingView {
    #[serde(rename = "rolesMapping")]
    pub roles_mapping: RolesMapping,
}

#[derive(Serialize)]
#[serde(rename = "rolesMapping")]
struct RolesMappingXml<'a> {
    #[serde(rename = "role")]
    roles: Vec<RoleXml<'a>>,
}

#[derive(Serialize)]
struct RoleXml<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "$text")]
    permission: &'a str,
}

impl Document for RolesMappingView {
    fn to_xml(&self) -> Result<String, String> {
        let document = RolesMappingXml {
            roles: self
                .roles_mapping
                .iter()
                .map(|(name, permission)| RoleXml { name, permission })
                .collect(),
        };
        quick_xml::se::to_string(&document).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "userDnPatterns")]
pub struct UserDnPatternsView {
    #[serde(rename = "userDnPattern")]
    pub user_dn_pattern: Vec<String>,
}

impl Document for UserDnPatternsView {}

#[derive(Debug, Serialize)]
#[serde(rename = "searchFilterConfiguration")]
pub struct SearchFilterView {
    #[serde(rename = "searchBase")]
    pub search_base: String,
    #[serde(rename = "searchFilter")]
    pub search_filter: String,
}

impl From<&SearchFilter> for SearchFilterView {
    fn from(search: &SearchFilter) -> Self {
        Self {
            search_base: search.search_base.clone(),
            search_filter: search.search_filter.clone(),
        }
    }
}

impl Document for SearchFilterView {}

#[derive(Debug, Serialize)]
#[serde(rename = "health")]
pub struct HealthView {
    pub status: &'static str,
    pub version: &'static str,
    pub reloads: u64,
}

impl Document for HealthView {}
