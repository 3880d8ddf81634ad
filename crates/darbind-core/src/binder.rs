//! Session directory binder.
//!
//! Establishes the alias from a session identifier to the canonical project
//! directory. The binder enforces the anti-hijacking rule (a token
//! authorized for path A is never bindable to path B) and is idempotent:
//! page reloads re-bind the same session without error and without touching
//! the existing alias.
//!
//! Creation is atomic via the store's create-if-absent primitive; there is
//! no check-then-create window, and a failed creation leaves no partial
//! alias behind.

use std::path::PathBuf;
use std::sync::Arc;

use darbind_store::{AliasStore, LinkOutcome};

use crate::error::BindError;
use crate::path::ProjectPath;

/// A bound session alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAlias {
    /// The session identifier the alias is named by.
    pub session_id: String,
    /// The canonical project directory the alias points at.
    pub target: PathBuf,
    /// Whether this call created the alias (false on idempotent re-bind).
    pub created: bool,
}

/// Binds validated sessions to project directories through an alias store.
pub struct SessionBinder {
    store: Arc<dyn AliasStore>,
    projects_root: PathBuf,
}

impl std::fmt::Debug for SessionBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBinder")
            .field("projects_root", &self.projects_root)
            .finish_non_exhaustive()
    }
}

impl SessionBinder {
    /// Create a binder over an alias store and the canonical project root.
    #[must_use]
    pub fn new(store: Arc<dyn AliasStore>, projects_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            projects_root: projects_root.into(),
        }
    }

    /// Bind a session to its authorized project directory.
    ///
    /// `requested` is the path the caller asked for; `authorized` is the
    /// path the validated credential carries. They must agree before
    /// anything touches the filesystem.
    ///
    /// Repeated calls with the same arguments succeed and return the
    /// existing alias with `created == false`. A re-bind whose existing
    /// alias points at a *different* directory is rejected; that indicates
    /// token/path inconsistency across calls, never a situation to paper
    /// over by relinking.
    ///
    /// # Errors
    ///
    /// - [`BindError::Forbidden`] on a requested/authorized mismatch
    /// - [`BindError::Conflict`] when the existing alias points elsewhere
    /// - [`BindError::Store`] on filesystem failure (surfaced, not retried)
    pub async fn bind(
        &self,
        session_id: &str,
        requested: &ProjectPath,
        authorized: &ProjectPath,
    ) -> Result<SessionAlias, BindError> {
        if requested != authorized {
            tracing::warn!(
                session_id,
                requested = %requested,
                "bind rejected: credential authorizes a different path"
            );
            return Err(BindError::Forbidden {
                requested: requested.to_string(),
                authorized: authorized.to_string(),
            });
        }

        self.link(session_id, requested).await
    }

    /// Bind an anonymous session to a project directory.
    ///
    /// Only reachable when the validator permits anonymous init. The
    /// session identifier is freshly minted, so the create-if-absent call
    /// always creates.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Store`] on filesystem failure.
    pub async fn bind_anonymous(
        &self,
        requested: &ProjectPath,
    ) -> Result<SessionAlias, BindError> {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        self.link(&session_id, requested).await
    }

    async fn link(
        &self,
        session_id: &str,
        path: &ProjectPath,
    ) -> Result<SessionAlias, BindError> {
        let target = path.join_under(&self.projects_root);

        match self.store.link_if_absent(session_id, &target).await? {
            LinkOutcome::Created => {
                tracing::info!(session_id, path = %path, "session bound");
                Ok(SessionAlias {
                    session_id: session_id.to_owned(),
                    target,
                    created: true,
                })
            }
            LinkOutcome::Existing => {
                // Idempotent re-bind, but only if the existing alias still
                // points where this session was authorized.
                let existing = self.store.target_of(session_id).await?;
                match existing {
                    Some(existing) if existing == target => Ok(SessionAlias {
                        session_id: session_id.to_owned(),
                        target,
                        created: false,
                    }),
                    Some(existing) => {
                        tracing::warn!(
                            session_id,
                            "bind conflict: existing alias points at a different directory"
                        );
                        Err(BindError::Conflict {
                            session_id: session_id.to_owned(),
                            existing: existing.display().to_string(),
                            requested: target.display().to_string(),
                        })
                    }
                    // Alias vanished between link and resolve; external
                    // cleanup is allowed to delete aliases at any time.
                    None => Err(BindError::Conflict {
                        session_id: session_id.to_owned(),
                        existing: String::new(),
                        requested: target.display().to_string(),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use darbind_store::{MemoryAliasStore, StoreError};

    use super::*;

    fn make_binder() -> SessionBinder {
        SessionBinder::new(Arc::new(MemoryAliasStore::new()), "/srv/projects")
    }

    fn path(s: &str) -> ProjectPath {
        ProjectPath::sanitize(s).unwrap()
    }

    #[tokio::test]
    async fn bind_creates_alias_under_projects_root() {
        let binder = make_binder();
        let p = path("proj1/main");

        let alias = binder.bind("s1", &p, &p).await.unwrap();
        assert!(alias.created);
        assert_eq!(alias.target, PathBuf::from("/srv/projects/proj1/main"));
    }

    #[tokio::test]
    async fn bind_twice_is_idempotent() {
        let binder = make_binder();
        let p = path("proj1/main");

        let first = binder.bind("s1", &p, &p).await.unwrap();
        let second = binder.bind("s1", &p, &p).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.target, second.target);
    }

    #[tokio::test]
    async fn mismatched_path_is_forbidden() {
        let binder = make_binder();
        let requested = path("projB/main");
        let authorized = path("projA/main");

        let err = binder.bind("s1", &requested, &authorized).await.unwrap_err();
        assert!(matches!(err, BindError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn forbidden_bind_touches_nothing() {
        let store = Arc::new(MemoryAliasStore::new());
        let binder = SessionBinder::new(Arc::clone(&store) as Arc<dyn AliasStore>, "/srv/projects");

        let requested = path("projB/main");
        let authorized = path("projA/main");
        let _ = binder.bind("s1", &requested, &authorized).await;

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rebind_to_different_path_is_conflict() {
        let store = Arc::new(MemoryAliasStore::new());
        let binder = SessionBinder::new(Arc::clone(&store) as Arc<dyn AliasStore>, "/srv/projects");

        let a = path("projA/main");
        let b = path("projB/main");
        binder.bind("s1", &a, &a).await.unwrap();

        let err = binder.bind("s1", &b, &b).await.unwrap_err();
        assert!(matches!(err, BindError::Conflict { .. }));

        // Original alias is untouched.
        assert_eq!(
            store.target_of("s1").await.unwrap(),
            Some(PathBuf::from("/srv/projects/projA/main"))
        );
    }

    #[tokio::test]
    async fn anonymous_binds_get_distinct_sessions() {
        let binder = make_binder();
        let p = path("proj1/main");

        let a = binder.bind_anonymous(&p).await.unwrap();
        let b = binder.bind_anonymous(&p).await.unwrap();

        assert!(a.created);
        assert!(b.created);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.target, b.target);
    }

    #[tokio::test]
    async fn bind_creates_symlink_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(darbind_store::FsAliasStore::new(dir.path().join("dars")));
        let binder = SessionBinder::new(
            Arc::clone(&store) as Arc<dyn AliasStore>,
            dir.path().join("projects"),
        );

        let p = path("proj1/main");
        let alias = binder.bind("s1", &p, &p).await.unwrap();
        assert!(alias.created);

        let link = dir.path().join("dars/s1");
        let resolved = tokio::fs::read_link(&link).await.unwrap();
        assert_eq!(resolved, dir.path().join("projects/proj1/main"));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_bind_error() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl AliasStore for FailingStore {
            async fn link_if_absent(
                &self,
                alias: &str,
                _target: &Path,
            ) -> Result<LinkOutcome, StoreError> {
                Err(StoreError::Link {
                    alias: alias.to_owned(),
                    reason: "disk full".to_owned(),
                })
            }

            async fn target_of(
                &self,
                _alias: &str,
            ) -> Result<Option<PathBuf>, StoreError> {
                Ok(None)
            }

            async fn list(&self) -> Result<Vec<String>, StoreError> {
                Ok(Vec::new())
            }
        }

        let binder = SessionBinder::new(Arc::new(FailingStore), "/srv/projects");
        let p = path("proj1/main");

        let err = binder.bind("s1", &p, &p).await.unwrap_err();
        assert!(matches!(err, BindError::Store(_)));
    }
}
