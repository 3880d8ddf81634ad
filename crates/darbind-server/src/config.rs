//! Server configuration for darbind.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The one exception is the token secret: there is no sensible default for
//! a credential-verification key, so startup fails without it.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Shared secret the token validator verifies credentials against.
    pub token_secret: String,
    /// Directory holding the session aliases (the archive root).
    pub archive_root: String,
    /// Canonical project store that aliases point into.
    pub projects_root: String,
    /// Route prefix (e.g. `/desktop`, `/edit/textilla`); empty for none.
    pub route_prefix: String,
    /// Whether sessions may be initialized without a credential.
    pub allow_anonymous: bool,
    /// Base URL of the external project-sync service, if any.
    pub sync_url: Option<String>,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DARBIND_TOKEN_SECRET`:**required**; verification key for
    ///   session tokens
    /// - `DARBIND_BIND_ADDR`:full bind address (overrides `PORT`,
    ///   default: `127.0.0.1:4000`)
    /// - `PORT`:port to bind on `0.0.0.0` (hosting convention)
    /// - `DARBIND_ARCHIVE_ROOT`:alias directory (default: `./dars`)
    /// - `DARBIND_PROJECTS_ROOT`:project store (default: `./projects`)
    /// - `DARBIND_ROUTE_PREFIX`:route prefix (default: none)
    /// - `DARBIND_ALLOW_ANONYMOUS`:permit anonymous init (default: `false`)
    /// - `DARBIND_SYNC_URL`:project-sync service base URL (optional)
    /// - `DARBIND_LOG_LEVEL`:log filter (default: `info`)
    ///
    /// # Errors
    ///
    /// Fails when `DARBIND_TOKEN_SECRET` is unset or empty, or when a
    /// supplied route prefix does not start with `/`.
    pub fn from_env() -> anyhow::Result<Self> {
        let token_secret = std::env::var("DARBIND_TOKEN_SECRET").unwrap_or_default();
        if token_secret.is_empty() {
            anyhow::bail!("DARBIND_TOKEN_SECRET environment variable must be set");
        }

        // Priority: DARBIND_BIND_ADDR > PORT > default 127.0.0.1:4000
        let bind_addr = if let Ok(addr) = std::env::var("DARBIND_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 4000)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(4000);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 4000))
        };

        let archive_root =
            std::env::var("DARBIND_ARCHIVE_ROOT").unwrap_or_else(|_| "./dars".to_owned());
        let projects_root =
            std::env::var("DARBIND_PROJECTS_ROOT").unwrap_or_else(|_| "./projects".to_owned());

        let route_prefix = std::env::var("DARBIND_ROUTE_PREFIX").unwrap_or_default();
        if !route_prefix.is_empty() && !route_prefix.starts_with('/') {
            anyhow::bail!("DARBIND_ROUTE_PREFIX must start with '/'");
        }

        let allow_anonymous = std::env::var("DARBIND_ALLOW_ANONYMOUS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let sync_url = std::env::var("DARBIND_SYNC_URL").ok();

        let log_level = std::env::var("DARBIND_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        Ok(Self {
            bind_addr,
            token_secret,
            archive_root,
            projects_root,
            route_prefix,
            allow_anonymous,
            sync_url,
            log_level,
        })
    }
}
