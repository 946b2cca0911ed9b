use axum::{
    extract::{Path, State},
    Json,
};

use crate::admin::views::{HealthView, RolesMappingView, SearchFilterView, UserDnPatternsView};
use crate::http::response::{Negotiated, Representation};
use crate::http::server::AppState;
use crate::service::{LdapConfigService, ServiceError};

/// Run a mutation on the blocking pool; commits take locks and write files.
async fn mutate<F>(state: &AppState, f: F) -> Result<(), ServiceError>
where
    F: FnOnce(&LdapConfigService) -> Result<(), ServiceError> + Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service)).await?
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthView> {
    Json(HealthView {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        reloads: state.authenticators.generation(),
    })
}

// ---- roles mapping ----

pub async fn get_roles_mapping(
    State(state): State<AppState>,
    representation: Representation,
) -> Negotiated<RolesMappingView> {
    let roles_mapping = state.service.roles_mapping().as_ref().clone();
    Negotiated::new(representation, RolesMappingView { roles_mapping })
}

/// PUT: insert or replace.
pub async fn put_role_mapping(
    State(state): State<AppState>,
    Path((role, permission)): Path<(String, String)>,
) -> Result<String, ServiceError> {
    let (r, p) = (role.clone(), permission.clone());
    mutate(&state, move |s| s.upsert_role_mapping(&r, &p)).await?;
    Ok(format!("role mapping {role} -> {permission} saved"))
}

/// POST: insert only; 400 if the role is already mapped.
pub async fn post_role_mapping(
    State(state): State<AppState>,
    Path((role, permission)): Path<(String, String)>,
) -> Result<String, ServiceError> {
    let (r, p) = (role.clone(), permission.clone());
    mutate(&state, move |s| s.insert_role_mapping_if_absent(&r, &p)).await?;
    Ok(format!("role mapping {role} -> {permission} added"))
}

pub async fn delete_role_mapping(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<String, ServiceError> {
    let r = role.clone();
    mutate(&state, move |s| s.delete_role_mapping(&r)).await?;
    Ok(format!("role mapping {role} removed"))
}

// ---- user DN patterns ----

pub async fn get_user_dn_patterns(
    State(state): State<AppState>,
    representation: Representation,
) -> Negotiated<UserDnPatternsView> {
    let user_dn_pattern = state.service.user_dn_patterns().as_ref().clone();
    Negotiated::new(representation, UserDnPatternsView { user_dn_pattern })
}

pub async fn post_user_dn_pattern(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<String, ServiceError> {
    let p = pattern.clone();
    mutate(&state, move |s| s.add_user_dn_pattern(&p)).await?;
    Ok(format!("user DN pattern {pattern} added to the userDnPatterns"))
}

pub async fn delete_user_dn_pattern(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<String, ServiceError> {
    let p = pattern.clone();
    mutate(&state, move |s| s.remove_user_dn_pattern(&p)).await?;
    Ok(format!("user DN pattern {pattern} removed from the userDnPatterns"))
}

// ---- search filters ----

pub async fn get_user_search_filter(
    State(state): State<AppState>,
    representation: Representation,
) -> Negotiated<SearchFilterView> {
    let view = SearchFilterView::from(state.service.user_search_filter().as_ref());
    Negotiated::new(representation, view)
}

pub async fn put_user_search_filter(
    State(state): State<AppState>,
    Path((search_base, search_filter)): Path<(String, String)>,
) -> Result<&'static str, ServiceError> {
    mutate(&state, move |s| {
        s.set_user_search_filter(&search_base, &search_filter)
    })
    .await?;
    Ok("User search filter updated.")
}

pub async fn get_group_search_filter(
    State(state): State<AppState>,
    representation: Representation,
) -> Negotiated<SearchFilterView> {
    let view = SearchFilterView::from(state.service.group_search_filter().as_ref());
    Negotiated::new(representation, view)
}

pub async fn put_group_search_filter(
    State(state): State<AppState>,
    Path((search_base, search_filter)): Path<(String, String)>,
) -> Result<&'static str, ServiceError> {
    mutate(&state, move |s| {
        s.set_group_search_filter(&search_base, &search_filter)
    })
    .await?;
    Ok("Group search filter updated.")
}
