//! Session teardown route: `DELETE /sessions/{session}`
//!
//! Fired from `beforeunload` when a tab goes away. Best-effort by contract:
//! the teardown request to the external service is dispatched in the
//! background and the route always answers 204; the browser is already
//! navigating and will never see a failure anyway. Aliases are not removed
//! here; alias cleanup is an external concern.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::delete;
use axum::Router;

use crate::state::AppState;

/// Build the `/sessions` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sessions/{session}", delete(teardown_session))
}

/// Request destruction of server-side ephemeral resources for a session.
async fn teardown_session(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> StatusCode {
    if let Some(sync) = state.sync.clone() {
        tokio::spawn(async move {
            if let Err(e) = sync.teardown(&session).await {
                tracing::debug!(session, error = %e, "session teardown failed (best effort)");
            }
        });
    } else {
        tracing::debug!(session, "no sync service configured, teardown dropped");
    }
    StatusCode::NO_CONTENT
}
