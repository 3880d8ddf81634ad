//! Client for the external project-sync service.
//!
//! After a flush, the platform's project layer is told that files under a
//! checkout changed so it can refresh its own view. The notification is an
//! empty-bodied POST; the sync service identifies the caller by checkout
//! identifier, not by session token.

use darbind_core::error::LifecycleError;
use darbind_core::lifecycle::SyncNotifier;

/// What the sync service should do with a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Refresh project files after a save.
    Save,
    /// Record a commit of the checkout.
    Commit,
}

impl SyncAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Commit => "commit",
        }
    }
}

/// Errors from sync notifications.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The HTTP request itself failed.
    #[error("sync request failed: {reason}")]
    Request { reason: String },

    /// The sync service answered with a non-success status.
    #[error("sync service returned {status}")]
    Status { status: u16 },
}

/// HTTP client for the project-sync endpoint.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    /// Create a client against the sync service base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Notify the sync service that a checkout's files changed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the request fails or the service answers
    /// with a non-success status.
    pub async fn notify(&self, checkout: &str, action: SyncAction) -> Result<(), SyncError> {
        let url = format!("{}/checkouts/{checkout}/{}", self.base_url, action.as_str());
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| SyncError::Request {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    /// Request teardown of server-side ephemeral resources for a session.
    ///
    /// Best-effort by contract: callers fire this and move on.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the request fails or the service answers
    /// with a non-success status.
    pub async fn teardown(&self, session: &str) -> Result<(), SyncError> {
        let url = format!("{}/sessions/{session}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| SyncError::Request {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Lets a [`LifecycleController`](darbind_core::lifecycle::LifecycleController)
/// drive its commit step through the real sync service.
#[async_trait::async_trait]
impl SyncNotifier for SyncClient {
    async fn notify_saved(&self, checkout: &str) -> Result<(), LifecycleError> {
        self.notify(checkout, SyncAction::Save)
            .await
            .map_err(|e| LifecycleError::Notify {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = SyncClient::new("http://sync.internal/");
        assert_eq!(client.base_url, "http://sync.internal");
    }

    #[test]
    fn action_names_match_route_verbs() {
        assert_eq!(SyncAction::Save.as_str(), "save");
        assert_eq!(SyncAction::Commit.as_str(), "commit");
    }
}
