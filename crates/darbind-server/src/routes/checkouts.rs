//! Checkout save/commit relay: `POST /checkouts/{checkout}/save|commit`
//!
//! After a browser-side flush, the editor notifies the project layer that
//! the checkout's files changed. These routes relay that to the external
//! sync service and answer 202 immediately; the notification is dispatched
//! in the background, mirroring the browser's own no-cors fire-and-forget
//! call. No request body is required.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;
use crate::sync::SyncAction;

/// Build the `/checkouts` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkouts/{checkout}/save", post(save_checkout))
        .route("/checkouts/{checkout}/commit", post(commit_checkout))
}

fn validate_checkout(checkout: &str) -> Result<(), AppError> {
    if checkout.is_empty()
        || !checkout
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(AppError::BadRequest(
            "checkout identifier may only contain alphanumeric characters, '_', and '-'"
                .to_owned(),
        ));
    }
    Ok(())
}

fn dispatch(state: &AppState, checkout: String, action: SyncAction) {
    let Some(sync) = state.sync.clone() else {
        tracing::info!(checkout, ?action, "no sync service configured, notification dropped");
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = sync.notify(&checkout, action).await {
            tracing::warn!(checkout, ?action, error = %e, "sync notification failed");
        }
    });
}

/// Notify the sync service that a checkout was saved.
async fn save_checkout(
    State(state): State<Arc<AppState>>,
    Path(checkout): Path<String>,
) -> Result<StatusCode, AppError> {
    validate_checkout(&checkout)?;
    dispatch(&state, checkout, SyncAction::Save);
    Ok(StatusCode::ACCEPTED)
}

/// Notify the sync service that a checkout was committed.
async fn commit_checkout(
    State(state): State<Arc<AppState>>,
    Path(checkout): Path<String>,
) -> Result<StatusCode, AppError> {
    validate_checkout(&checkout)?;
    dispatch(&state, checkout, SyncAction::Commit);
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_validate() {
        assert!(validate_checkout("co-123_abc").is_ok());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        assert!(validate_checkout("").is_err());
    }

    #[test]
    fn path_like_identifier_is_rejected() {
        assert!(validate_checkout("../other").is_err());
        assert!(validate_checkout("a/b").is_err());
    }
}
