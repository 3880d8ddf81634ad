//! Archive storage gateway routes: `/dars/{session}/…`
//!
//! A generic read/write surface over the archive root, oblivious to what it
//! stores. Every request passes the session middleware first, which
//! re-validates the credential, checks that the session identifier in the
//! URL belongs to that credential, and re-binds idempotently, so the alias
//! is guaranteed to exist and point at the authorized directory before any
//! file I/O happens.
//!
//! File paths beneath the alias go through the same sanitizer as project
//! paths; a `..` in a gateway URL is a 400, never a filesystem access.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self as axum_mw, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use darbind_core::path::ProjectPath;
use darbind_core::token::Identity;

use crate::credentials;
use crate::error::AppError;
use crate::state::AppState;

/// Build the `/dars` router with the session middleware applied.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/dars/{session}/{*path}", get(read_file).put(write_file))
        .route("/dars/{session}", post(seed_archive))
        .route_layer(axum_mw::from_fn_with_state(state, session_middleware))
}

/// Authorize a gateway request and guarantee the alias exists.
///
/// Token sessions: the URL's session id must equal the id derived from the
/// credential (a valid token for session A grants nothing on session B),
/// and the alias is re-bound idempotently against the token's authorized
/// path. Anonymous sessions carry no claim to re-bind from, so the alias
/// must already exist from init.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = params
        .get("session")
        .ok_or_else(|| AppError::BadRequest("missing session identifier".to_owned()))?;

    let credential = credentials::extract(&headers, &query);
    let identity = state.validator.validate(credential.as_deref())?;

    match identity {
        Identity::Authorized {
            session_id,
            authorized_path,
        } => {
            if &session_id != session {
                return Err(AppError::Forbidden(
                    "session does not belong to this credential".to_owned(),
                ));
            }
            let authorized = ProjectPath::sanitize(&authorized_path).map_err(|_| {
                AppError::Unauthorized("credential authorizes an invalid path".to_owned())
            })?;
            state
                .binder
                .bind(&session_id, &authorized, &authorized)
                .await?;
        }
        Identity::Anonymous => {
            if !state.store.exists(session).await? {
                return Err(AppError::NotFound(format!("unknown session '{session}'")));
            }
        }
    }

    Ok(next.run(request).await)
}

/// Resolve a gateway path to a file beneath the session's alias target.
async fn resolve(
    state: &AppState,
    session: &str,
    rel_path: &str,
) -> Result<PathBuf, AppError> {
    let rel = ProjectPath::sanitize_file(rel_path)?;
    let target = state
        .store
        .target_of(session)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown session '{session}'")))?;
    Ok(rel.join_under(&target))
}

/// Read a file from the session's archive directory.
async fn read_file(
    State(state): State<Arc<AppState>>,
    Path((session, rel_path)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let file = resolve(&state, &session, &rel_path).await?;

    match tokio::fs::read(&file).await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("no such file '{rel_path}'")))
        }
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// Write a file into the session's archive directory.
async fn write_file(
    State(state): State<Arc<AppState>>,
    Path((session, rel_path)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let file = resolve(&state, &session, &rel_path).await?;

    // Parent directories only ever materialize beneath the alias target;
    // the sanitized rel path cannot climb out of it.
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    tokio::fs::write(&file, &body)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::debug!(session, path = rel_path, bytes = body.len(), "archive write");
    Ok(StatusCode::NO_CONTENT)
}

/// Seed a file into a fresh archive: `POST /dars/{session}?filename=…`
///
/// The historical create endpoint took a multipart upload per file; this
/// takes one raw body per call with the name in the query string.
async fn seed_archive(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let filename = query
        .get("filename")
        .ok_or_else(|| AppError::BadRequest("missing 'filename' query parameter".to_owned()))?;

    let file = resolve(&state, &session, filename).await?;
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    tokio::fs::write(&file, &body)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(session, filename, "archive seeded");
    Ok(StatusCode::CREATED)
}
