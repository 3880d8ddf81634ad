//! In-memory alias store for testing.
//!
//! Stores aliases in a `BTreeMap` behind a `RwLock`. Not persistent; all
//! aliases are lost when the process exits. Use this for unit tests that
//! need real binder semantics without touching disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{AliasStore, LinkOutcome, StoreError};

/// An in-memory alias store backed by a `BTreeMap`.
///
/// Thread-safe and async-compatible. The write lock held across the
/// insert makes `link_if_absent` atomic, matching the symlink semantics of
/// [`FsAliasStore`](crate::FsAliasStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryAliasStore {
    aliases: Arc<RwLock<BTreeMap<String, PathBuf>>>,
}

impl MemoryAliasStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AliasStore for MemoryAliasStore {
    async fn link_if_absent(
        &self,
        alias: &str,
        target: &Path,
    ) -> Result<LinkOutcome, StoreError> {
        if alias.is_empty() || alias.contains('/') {
            return Err(StoreError::InvalidAlias {
                alias: alias.to_owned(),
            });
        }

        let mut aliases = self.aliases.write().await;
        if aliases.contains_key(alias) {
            return Ok(LinkOutcome::Existing);
        }
        aliases.insert(alias.to_owned(), target.to_path_buf());
        Ok(LinkOutcome::Created)
    }

    async fn target_of(&self, alias: &str) -> Result<Option<PathBuf>, StoreError> {
        let aliases = self.aliases.read().await;
        Ok(aliases.get(alias).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let aliases = self.aliases.read().await;
        Ok(aliases.keys().cloned().collect())
    }
}
