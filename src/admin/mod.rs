pub mod auth;
pub mod handlers;
pub mod views;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Routes under `/configuration/ldap`, guarded by the admin API key.
pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/configuration/ldap/rolesMapping", get(get_roles_mapping))
        .route(
            "/configuration/ldap/rolesMapping/{role}/{permission}",
            axum::routing::put(put_role_mapping).post(post_role_mapping),
        )
        .route(
            "/configuration/ldap/rolesMapping/{role}",
            axum::routing::delete(delete_role_mapping),
        )
        .route("/configuration/ldap/userDnPatterns", get(get_user_dn_patterns))
        .route(
            "/configuration/ldap/userDnPatterns/{pattern}",
            axum::routing::post(post_user_dn_pattern).delete(delete_user_dn_pattern),
        )
        .route("/configuration/ldap/userSearchFilter", get(get_user_search_filter))
        .route(
            "/configuration/ldap/userSearchFilter/{search_base}/{search_filter}",
            axum::routing::put(put_user_search_filter),
        )
        .route("/configuration/ldap/groupSearchFilter", get(get_group_search_filter))
        .route(
            "/configuration/ldap/groupSearchFilter/{search_base}/{search_filter}",
            axum::routing::put(put_group_search_filter),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
