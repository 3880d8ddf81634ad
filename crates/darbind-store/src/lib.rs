//! Alias store abstraction for darbind.
//!
//! This crate defines the [`AliasStore`] trait, the archive-root surface the
//! session binder writes through. An alias is a link from a session
//! identifier to a canonical project directory. The only mutation the trait
//! permits is *create-if-absent*: aliases are never rebound, moved, or
//! deleted by this layer, so independent sessions never contend for locks.
//!
//! Two implementations are provided:
//!
//! - [`FsAliasStore`]: production default, symlinks under an archive root
//!   directory
//! - [`MemoryAliasStore`]: in-memory, for testing only

mod error;
mod fs;
mod memory;

use std::path::{Path, PathBuf};

pub use error::StoreError;
pub use fs::FsAliasStore;
pub use memory::MemoryAliasStore;

/// Outcome of a [`AliasStore::link_if_absent`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The alias did not exist and was created by this call.
    Created,
    /// An alias with this name already existed; nothing was changed.
    Existing,
}

/// A store of session aliases beneath a single archive root.
///
/// Alias names are opaque session identifiers (no path separators); targets
/// are absolute or root-relative project directories. Creation must be atomic
/// with respect to the existence check: implementations use a primitive
/// that fails on an existing entry rather than checking first.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait AliasStore: Send + Sync + 'static {
    /// Create the alias pointing at `target` unless it already exists.
    ///
    /// Returns [`LinkOutcome::Existing`] without inspecting the current
    /// target when the alias is already present; callers that care whether
    /// the existing alias agrees with `target` follow up with
    /// [`target_of`](AliasStore::target_of).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Init`] if the archive root cannot be created,
    /// or [`StoreError::Link`] if the link operation itself fails.
    async fn link_if_absent(
        &self,
        alias: &str,
        target: &Path,
    ) -> Result<LinkOutcome, StoreError>;

    /// Resolve the target an alias points at.
    ///
    /// Returns `Ok(None)` if the alias does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Resolve`] if the alias exists but cannot be
    /// read.
    async fn target_of(&self, alias: &str) -> Result<Option<PathBuf>, StoreError>;

    /// List all alias names in the store.
    ///
    /// Used for diagnostics and duplicate-detection in tests; an absent
    /// archive root lists as empty rather than erroring.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] if the underlying listing fails.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Check whether an alias exists.
    ///
    /// The default implementation calls [`target_of`](AliasStore::target_of)
    /// and checks for `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Resolve`] if the underlying lookup fails.
    async fn exists(&self, alias: &str) -> Result<bool, StoreError> {
        Ok(self.target_of(alias).await?.is_some())
    }
}
