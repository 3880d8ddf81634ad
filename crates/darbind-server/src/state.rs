//! Shared application state for the darbind server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the token validator, session binder,
//! alias store, and the optional sync client.

use std::sync::Arc;

use darbind_core::binder::SessionBinder;
use darbind_core::token::TokenValidator;
use darbind_store::AliasStore;

use crate::sync::SyncClient;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Credential verification.
    pub validator: TokenValidator,
    /// Session-to-directory binding.
    pub binder: SessionBinder,
    /// The alias store (also used directly by the gateway to resolve
    /// session targets).
    pub store: Arc<dyn AliasStore>,
    /// Project-sync client (`None` when no sync service is configured).
    pub sync: Option<Arc<SyncClient>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
