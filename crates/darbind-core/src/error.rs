//! Error types for `darbind-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Credential errors never include the credential itself, only
//! the failure mode.

use darbind_store::StoreError;

/// Errors from credential validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was supplied and anonymous binding is not allowed.
    #[error("missing credential")]
    MissingCredential,

    /// The credential is not a well-formed token.
    #[error("malformed credential: {reason}")]
    Malformed { reason: String },

    /// The signature does not verify against the configured secret.
    #[error("credential signature verification failed")]
    BadSignature,

    /// The credential has expired.
    #[error("credential expired at {expired_at}")]
    Expired { expired_at: i64 },
}

/// Why a raw path was rejected by the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorReason {
    /// The path contained a `..` segment or resolved outside the root.
    Traversal,
    /// The path was empty after normalization.
    Empty,
    /// The path used a reserved name (`.`, null bytes).
    Reserved,
}

impl std::fmt::Display for PathErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Traversal => "traversal",
            Self::Empty => "empty",
            Self::Reserved => "reserved",
        };
        f.write_str(s)
    }
}

/// Errors from path sanitization.
#[derive(Debug, thiserror::Error)]
#[error("invalid project path: {reason}")]
pub struct PathError {
    /// Which rule the raw path violated.
    pub reason: PathErrorReason,
}

impl PathError {
    pub(crate) fn new(reason: PathErrorReason) -> Self {
        Self { reason }
    }
}

/// Errors from session binding.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The requested path differs from the path the credential authorizes.
    #[error("credential authorizes '{authorized}', not '{requested}'")]
    Forbidden {
        requested: String,
        authorized: String,
    },

    /// An alias for this session already exists but points elsewhere.
    #[error("session '{session_id}' is already bound to a different path")]
    Conflict {
        session_id: String,
        existing: String,
        requested: String,
    },

    /// The alias store failed.
    #[error("bind store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the session lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The requested transition is not legal from the current state.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// A save was requested while another save is still in flight.
    #[error("a save is already in flight")]
    SaveInFlight,

    /// Flushing editor state to the archive failed.
    #[error("flush failed: {reason}")]
    Flush { reason: String },

    /// Notifying the project-sync service failed.
    #[error("sync notification failed: {reason}")]
    Notify { reason: String },
}
