//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Apply externally edited LDAP configurations while serving

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{handlers::get_health, setup_admin_router};
use crate::config::ServiceConfig;
use crate::ldap::AuthenticatorRegistry;
use crate::lifecycle::ShutdownSignal;
use crate::registry::LdapConfig;
use crate::service::LdapConfigService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LdapConfigService>,
    pub authenticators: Arc<AuthenticatorRegistry>,
    pub api_key: Option<Arc<str>>,
}

/// HTTP server for the configuration API.
pub struct HttpServer {
    router: Router,
    service: Arc<LdapConfigService>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: &ServiceConfig,
        service: Arc<LdapConfigService>,
        authenticators: Arc<AuthenticatorRegistry>,
    ) -> Self {
        let state = AppState {
            service: service.clone(),
            authenticators,
            api_key: config.admin.api_key.as_deref().map(Arc::from),
        };

        let router = Self::build_router(config, state);
        Self { router, service }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(get_health))
            .with_state(state.clone())
            .merge(setup_admin_router(state))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` (store file edits) are
    /// applied to the registry as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<LdapConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let service = self.service.clone();
        let updates = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let service = service.clone();
                let applied =
                    tokio::task::spawn_blocking(move || service.apply_external(config)).await;
                match applied {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Rejected external LDAP configuration change")
                    }
                    Err(e) => tracing::error!(error = %e, "External change task failed"),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        updates.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::store::MemoryStore;

    fn server(config: &ServiceConfig) -> HttpServer {
        let authenticators = Arc::new(AuthenticatorRegistry::new());
        let service = LdapConfigService::bootstrap(
            Arc::new(MemoryStore::new()),
            authenticators.clone(),
            LdapConfig::default(),
        )
        .unwrap();
        HttpServer::new(config, Arc::new(service), authenticators)
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let router = server(&ServiceConfig::default()).router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_mutation_through_router_commits() {
        let server = server(&ServiceConfig::default());
        let service = server.service.clone();

        let response = server
            .router()
            .oneshot(
                Request::post("/configuration/ldap/rolesMapping/Testers/TESTER_ROLE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.roles_mapping()["Testers"], "TESTER_ROLE");

        let response = server
            .router()
            .oneshot(
                Request::post("/configuration/ldap/rolesMapping/Testers/OTHER_ROLE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_key_when_configured() {
        let mut config = ServiceConfig::default();
        config.admin.api_key = Some("secret".into());
        let router = server(&config).router();

        let response = router
            .clone()
            .oneshot(
                Request::get("/configuration/ldap/userDnPatterns")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::get("/configuration/ldap/userDnPatterns")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
