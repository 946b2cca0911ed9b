//! LDAP Configuration Registry (v1)
//!
//! An HTTP service that owns the LDAP authentication configuration of a
//! repository server and lets administrators change it at runtime.
//!
//! # Architecture Overview
//!
//! ```text
//!     Admin Request            ┌──────────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ──▶ admin handlers                 │
//!                              │                        │                         │
//!                              │                        ▼                         │
//!                              │                 LdapConfigService                │
//!                              │          ┌─────────────┼──────────────┐          │
//!                              │          ▼             ▼              ▼          │
//!                              │   Configuration   ConfigStore   Authenticator    │
//!                              │     Registry      (TOML file)     Registry       │
//!                              │                        ▲                         │
//!                              │                        │ external edits          │
//!                              │                   ConfigWatcher                  │
//!                              └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use ldap_config_registry::config::{load_config, parse_config};
use ldap_config_registry::lifecycle::{self, signals, Shutdown};
use ldap_config_registry::observability::{logging, metrics};
use ldap_config_registry::HttpServer;

#[derive(Parser)]
#[command(name = "ldap-config-registry")]
#[command(about = "Runtime-editable LDAP configuration service", long_about = None)]
struct Args {
    /// Service configuration file (TOML); built-in defaults when omitted.
    #[arg(short, long, env = "LDAP_CONFIG_REGISTRY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => parse_config("")?,
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ldap-config-registry starting");
    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        admin_auth = config.admin.api_key.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let runtime = lifecycle::bootstrap(&config)?;

    // Bind last: traffic only once the registry is ready.
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, runtime.service, runtime.authenticators);
    let server_task = tokio::spawn(server.run(
        listener,
        runtime.config_updates,
        shutdown.subscribe(),
    ));

    signals::termination().await;
    shutdown.trigger();
    server_task.await??;

    drop(runtime.watcher);
    tracing::info!("Shutdown complete");
    Ok(())
}
