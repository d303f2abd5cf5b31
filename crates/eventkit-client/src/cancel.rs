//! Cancellation sources for in-flight requests.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Handle that aborts the request it was issued with.
///
/// Clones share the same signal. Two sources compare equal only when they
/// are clones of each other.
#[derive(Clone, Default)]
pub struct CancelSource {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl CancelSource {
    /// Create a fresh, uncancelled source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the request. Only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        let _ = self.reason.set(reason.into());
        self.token.cancel();
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason passed to `cancel`, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// Resolves once the source is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl PartialEq for CancelSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.reason, &other.reason)
    }
}

impl Eq for CancelSource {}

impl fmt::Debug for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSource")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}
