//! Session lifecycle controller.
//!
//! Drives one editing session through init → bound → save/commit cycles →
//! close. Ordinary gateway I/O does not change state; only init, save,
//! close, and unload do. The controller guarantees that a flush always
//! completes before a commit notification goes out, and that a second save
//! cannot start while one is in flight (the Flushing/Committing states act
//! as the busy flag; no lock is held across awaits).
//!
//! There is exactly one controller per tab. No cross-tab coordination
//! exists: two tabs bound to the same session can race on flush, and the
//! last flush wins. That is documented behavior, not a bug to fix with
//! locking.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::LifecycleError;

/// The state of one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No init has happened yet.
    Uninitialized,
    /// Alias exists; gateway I/O may flow.
    Bound,
    /// In-editor state is being pushed through the gateway.
    Flushing,
    /// The project-sync service is being notified of changed files.
    Committing,
    /// The session has been explicitly closed.
    Closed,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Bound => "bound",
            Self::Flushing => "flushing",
            Self::Committing => "committing",
            Self::Closed => "closed",
        }
    }
}

/// Pushes in-editor state out through the archive gateway.
#[async_trait::async_trait]
pub trait ArchiveFlush: Send + Sync + 'static {
    /// Flush pending editor state.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Flush`] when the gateway write fails.
    async fn flush(&self) -> Result<(), LifecycleError>;
}

/// Notifies the external project-sync service that files changed.
#[async_trait::async_trait]
pub trait SyncNotifier: Send + Sync + 'static {
    /// Notify the sync service for the given checkout.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Notify`] when the notification fails.
    async fn notify_saved(&self, checkout: &str) -> Result<(), LifecycleError>;
}

/// Drives the lifecycle of a single editing session.
pub struct LifecycleController {
    state: Mutex<SessionState>,
    flusher: Arc<dyn ArchiveFlush>,
    notifier: Option<Arc<dyn SyncNotifier>>,
    checkout: Option<String>,
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl LifecycleController {
    /// Create a controller in the [`SessionState::Uninitialized`] state.
    ///
    /// `notifier` and `checkout` are optional together: the commit step is
    /// skipped unless both are present.
    #[must_use]
    pub fn new(
        flusher: Arc<dyn ArchiveFlush>,
        notifier: Option<Arc<dyn SyncNotifier>>,
        checkout: Option<String>,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialized),
            flusher,
            notifier,
            checkout,
        }
    }

    /// Current state.
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Mark the session bound after a successful init + bind.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] unless the session is
    /// uninitialized.
    pub async fn init(&self) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        if *state != SessionState::Uninitialized {
            return Err(LifecycleError::InvalidTransition {
                from: state.name(),
                to: SessionState::Bound.name(),
            });
        }
        *state = SessionState::Bound;
        Ok(())
    }

    /// Save: flush editor state, then (optionally) notify the sync service.
    ///
    /// The flush always completes before the commit notification is issued.
    /// A notify failure is logged and not surfaced; the save succeeded
    /// once the flush did.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::SaveInFlight`] while another save is running
    /// - [`LifecycleError::InvalidTransition`] from any non-bound state
    /// - [`LifecycleError::Flush`] when the flush itself fails (state
    ///   returns to bound; the caller may retry)
    pub async fn save(&self) -> Result<(), LifecycleError> {
        self.begin_flush().await?;

        if let Err(e) = self.flusher.flush().await {
            *self.state.lock().await = SessionState::Bound;
            return Err(e);
        }

        if let (Some(notifier), Some(checkout)) = (&self.notifier, &self.checkout) {
            *self.state.lock().await = SessionState::Committing;
            if let Err(e) = notifier.notify_saved(checkout).await {
                tracing::warn!(checkout, error = %e, "commit notification failed");
            }
        }

        *self.state.lock().await = SessionState::Bound;
        Ok(())
    }

    /// Close: final flush, then the session is done.
    ///
    /// The session transitions to [`SessionState::Closed`] even when the
    /// final flush fails (the tab is navigating away regardless), but the
    /// flush error is still returned so the caller can report it.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::SaveInFlight`] / [`LifecycleError::InvalidTransition`]
    ///   as for [`save`](Self::save)
    /// - [`LifecycleError::Flush`] when the final flush fails
    pub async fn close(&self) -> Result<(), LifecycleError> {
        self.begin_flush().await?;

        let result = self.flusher.flush().await;
        *self.state.lock().await = SessionState::Closed;
        result
    }

    /// Best-effort flush on tab unload.
    ///
    /// Fire-and-forget: spawns the flush and returns immediately. Failure
    /// is logged at debug level only, never retried, never surfaced. This
    /// is a known, accepted data-loss window.
    pub async fn unload(&self) {
        if *self.state.lock().await != SessionState::Bound {
            return;
        }
        let flusher = Arc::clone(&self.flusher);
        tokio::spawn(async move {
            if let Err(e) = flusher.flush().await {
                tracing::debug!(error = %e, "unload flush failed (best effort)");
            }
        });
    }

    async fn begin_flush(&self) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        match *state {
            SessionState::Bound => {
                *state = SessionState::Flushing;
                Ok(())
            }
            SessionState::Flushing | SessionState::Committing => {
                Err(LifecycleError::SaveInFlight)
            }
            other => Err(LifecycleError::InvalidTransition {
                from: other.name(),
                to: SessionState::Flushing.name(),
            }),
        }
    }
}
