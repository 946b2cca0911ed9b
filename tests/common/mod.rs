//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use ldap_config_registry::config::ServiceConfig;
use ldap_config_registry::http::HttpServer;
use ldap_config_registry::ldap::AuthenticatorRegistry;
use ldap_config_registry::lifecycle::Shutdown;
use ldap_config_registry::registry::{LdapConfig, SearchFilter};
use ldap_config_registry::service::LdapConfigService;
use ldap_config_registry::store::{ConfigStore, MemoryStore};

/// The configuration every API test starts from.
pub fn fixture() -> LdapConfig {
    let mut config = LdapConfig::default();
    config
        .roles_mapping
        .insert("Developers".into(), "REPOSITORY_MANAGER".into());
    config
        .roles_mapping
        .insert("Contributors".into(), "USER_ROLE".into());
    config.user_dn_patterns = vec!["uid={0},ou=Users".into()];
    config.user_search = SearchFilter::new("ou=people", "(uid={0})");
    config.group_search = SearchFilter::new("ou=Groups", "(uniqueMember={0})");
    config
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub service: Arc<LdapConfigService>,
    pub authenticators: Arc<AuthenticatorRegistry>,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServiceConfig::default()).await
    }

    pub async fn start_with(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::with_config(fixture()));
        let authenticators = Arc::new(AuthenticatorRegistry::new());
        let service = Arc::new(
            LdapConfigService::bootstrap(
                store.clone() as Arc<dyn ConfigStore>,
                authenticators.clone(),
                LdapConfig::default(),
            )
            .unwrap(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let (_, config_updates) = mpsc::unbounded_channel();
        let server = HttpServer::new(&config, service.clone(), authenticators.clone());
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, config_updates, server_shutdown).await;
        });

        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        Self {
            addr,
            service,
            authenticators,
            store,
            client,
            shutdown,
        }
    }

    /// URL for the given path segments; each segment is percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = Url::parse(&format!("http://{}/", self.addr)).unwrap();
        url.path_segments_mut()
            .unwrap()
            .pop_if_empty()
            .extend(segments);
        url
    }

    /// URL under `/configuration/ldap`.
    pub fn ldap_url(&self, segments: &[&str]) -> Url {
        let mut all = vec!["configuration", "ldap"];
        all.extend_from_slice(segments);
        self.url(&all)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
