//! Store error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger. Alias names appear in errors; link targets do not,
//! since targets can embed project names callers may not want logged.

/// Errors that can occur during alias store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to create or open the archive root directory.
    #[error("failed to initialize archive root '{path}': {reason}")]
    Init { path: String, reason: String },

    /// Failed to create an alias link.
    #[error("failed to link alias '{alias}': {reason}")]
    Link { alias: String, reason: String },

    /// Failed to resolve an existing alias.
    #[error("failed to resolve alias '{alias}': {reason}")]
    Resolve { alias: String, reason: String },

    /// Failed to list aliases under the archive root.
    #[error("failed to list aliases: {reason}")]
    List { reason: String },

    /// An alias name contained a path separator or other illegal character.
    #[error("invalid alias name '{alias}'")]
    InvalidAlias { alias: String },
}
