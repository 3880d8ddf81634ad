//! Filesystem alias store, the production default.
//!
//! Aliases are symlinks under an archive root directory, named by session
//! identifier and pointing at canonical project directories. The
//! create-if-absent guarantee comes from `symlink(2)` itself: the syscall
//! fails with `EEXIST` when the name is taken, so there is no window between
//! an existence check and the creation, and a failed call leaves no partial
//! entry behind.
//!
//! The archive root is created lazily on the first link. Nothing in this
//! layer ever deletes or rewrites an alias; cleanup is an external concern.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{AliasStore, LinkOutcome, StoreError};

/// An alias store backed by symlinks under a root directory.
///
/// # Examples
///
/// ```no_run
/// # use darbind_store::FsAliasStore;
/// let store = FsAliasStore::new("/srv/darbind/dars");
/// ```
#[derive(Debug, Clone)]
pub struct FsAliasStore {
    root: PathBuf,
}

impl FsAliasStore {
    /// Create a store over the given archive root.
    ///
    /// The directory is not touched here; it is created lazily when the
    /// first alias is linked.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the archive root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject alias names that could escape the archive root.
    fn check_alias(alias: &str) -> Result<(), StoreError> {
        if alias.is_empty()
            || alias.contains('/')
            || alias.contains('\\')
            || alias.contains('\0')
            || alias == "."
            || alias == ".."
        {
            return Err(StoreError::InvalidAlias {
                alias: alias.to_owned(),
            });
        }
        Ok(())
    }

    async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            tokio::fs::symlink(target, link).await
        }
        #[cfg(windows)]
        {
            tokio::fs::symlink_dir(target, link).await
        }
    }
}

#[async_trait::async_trait]
impl AliasStore for FsAliasStore {
    async fn link_if_absent(
        &self,
        alias: &str,
        target: &Path,
    ) -> Result<LinkOutcome, StoreError> {
        Self::check_alias(alias)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Init {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;

        let link = self.root.join(alias);
        match Self::symlink(target, &link).await {
            Ok(()) => {
                tracing::debug!(alias, "alias created");
                Ok(LinkOutcome::Created)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(LinkOutcome::Existing),
            Err(e) => Err(StoreError::Link {
                alias: alias.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn target_of(&self, alias: &str) -> Result<Option<PathBuf>, StoreError> {
        Self::check_alias(alias)?;

        match tokio::fs::read_link(self.root.join(alias)).await {
            Ok(target) => Ok(Some(target)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Resolve {
                alias: alias.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            // Root not yet created means no aliases, not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::List {
                    reason: e.to_string(),
                })
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => {
                    return Err(StoreError::List {
                        reason: e.to_string(),
                    })
                }
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsAliasStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAliasStore::new(dir.path().join("dars"));
        (dir, store)
    }

    #[tokio::test]
    async fn link_creates_root_lazily() {
        let (dir, store) = make_store();
        assert!(!dir.path().join("dars").exists());

        let outcome = store
            .link_if_absent("s1", Path::new("/projects/a"))
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::Created);
        assert!(dir.path().join("dars").is_dir());
    }

    #[tokio::test]
    async fn link_twice_reports_existing() {
        let (_dir, store) = make_store();
        let target = Path::new("/projects/a");

        assert_eq!(
            store.link_if_absent("s1", target).await.unwrap(),
            LinkOutcome::Created
        );
        assert_eq!(
            store.link_if_absent("s1", target).await.unwrap(),
            LinkOutcome::Existing
        );
        assert_eq!(store.list().await.unwrap(), vec!["s1"]);
    }

    #[tokio::test]
    async fn existing_alias_keeps_original_target() {
        let (_dir, store) = make_store();
        store
            .link_if_absent("s1", Path::new("/projects/a"))
            .await
            .unwrap();
        store
            .link_if_absent("s1", Path::new("/projects/b"))
            .await
            .unwrap();

        let target = store.target_of("s1").await.unwrap().unwrap();
        assert_eq!(target, PathBuf::from("/projects/a"));
    }

    #[tokio::test]
    async fn target_of_missing_alias_is_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.target_of("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_without_root_is_empty() {
        let (_dir, store) = make_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn alias_with_separator_is_rejected() {
        let (_dir, store) = make_store();
        let err = store
            .link_if_absent("../escape", Path::new("/projects/a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidAlias { .. }));
    }

    #[tokio::test]
    async fn dot_dot_alias_is_rejected() {
        let (_dir, store) = make_store();
        let err = store.target_of("..").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidAlias { .. }));
    }

    #[tokio::test]
    async fn failed_link_leaves_no_partial_entry() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the root should be makes create_dir_all fail.
        let root = dir.path().join("dars");
        std::fs::write(&root, b"not a directory").unwrap();
        let store = FsAliasStore::new(&root);

        let err = store
            .link_if_absent("s1", Path::new("/projects/a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Init { .. }));
        assert!(!root.join("s1").exists());
    }
}
