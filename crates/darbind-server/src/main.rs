//! darbind server entry point.
//!
//! Loads configuration (refusing to start without the token secret), builds
//! the validator/binder/store state, then starts the Axum HTTP server with
//! graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use darbind_core::binder::SessionBinder;
use darbind_core::token::TokenValidator;
use darbind_store::{AliasStore, FsAliasStore};

use darbind_server::config::ServerConfig;
use darbind_server::router::build_router;
use darbind_server::state::AppState;
use darbind_server::sync::SyncClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment. Fails fast when the token
    // secret is absent.
    let config = ServerConfig::from_env()?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        archive_root = %config.archive_root,
        projects_root = %config.projects_root,
        allow_anonymous = config.allow_anonymous,
        "darbind starting"
    );

    let state = build_app_state(&config);
    let app = build_router(state, &config.route_prefix);

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, prefix = %config.route_prefix, "darbind server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("darbind server stopped");
    Ok(())
}

/// Build the shared application state.
fn build_app_state(config: &ServerConfig) -> Arc<AppState> {
    let store: Arc<dyn AliasStore> = Arc::new(FsAliasStore::new(&config.archive_root));

    let validator = TokenValidator::new(
        config.token_secret.as_bytes().to_vec(),
        !config.allow_anonymous,
    );
    let binder = SessionBinder::new(Arc::clone(&store), &config.projects_root);

    let sync = config.sync_url.as_ref().map(|url| {
        info!(url = %url, "project-sync notifications enabled");
        Arc::new(SyncClient::new(url.clone()))
    });
    if sync.is_none() {
        info!("no DARBIND_SYNC_URL set, save/commit notifications are no-ops");
    }

    Arc::new(AppState {
        validator,
        binder,
        store,
        sync,
    })
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
