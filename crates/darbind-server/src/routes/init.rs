//! Session init route: `GET /init?path=&token=`
//!
//! The entry point of every editing session: validates the credential,
//! sanitizes the requested path, binds the session alias, and hands the
//! opaque session identifier back as plain text. Repeating the call (page
//! reload) re-binds idempotently and returns the same identifier.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;

use darbind_core::path::ProjectPath;
use darbind_core::token::Identity;

use crate::credentials;
use crate::error::AppError;
use crate::state::AppState;

/// Build the `/init` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/init", get(init_session))
}

/// Initialize (or re-initialize) an editing session.
async fn init_session(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<(StatusCode, String), AppError> {
    let raw_path = query
        .get("path")
        .ok_or_else(|| AppError::BadRequest("missing 'path' query parameter".to_owned()))?;
    let requested = ProjectPath::sanitize(raw_path)?;

    let credential = credentials::extract(&headers, &query);
    let identity = state.validator.validate(credential.as_deref())?;

    let alias = match identity {
        Identity::Authorized {
            session_id,
            authorized_path,
        } => {
            // The claim comes from the trusted issuer, but it still has to
            // be a bindable path before we compare against it.
            let authorized = ProjectPath::sanitize(&authorized_path).map_err(|_| {
                AppError::Unauthorized("credential authorizes an invalid path".to_owned())
            })?;
            state.binder.bind(&session_id, &requested, &authorized).await?
        }
        Identity::Anonymous => state.binder.bind_anonymous(&requested).await?,
    };

    Ok((StatusCode::OK, alias.session_id))
}
