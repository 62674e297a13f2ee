//! Host hooks the dispatcher needs from the page environment.

use async_trait::async_trait;
use worker_protocol::Permission;

/// The host's notification-permission store and prompt.
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    /// Current decision without prompting.
    fn current(&self) -> Permission;

    /// Prompt the user and wait for the answer. Implementations remember
    /// the answer; a denied state must not prompt again.
    async fn request(&self) -> Permission;
}

/// Direct user-visible alert used when notifications are unavailable.
#[async_trait]
pub trait FallbackAlert: Send + Sync {
    async fn alert(&self, message: &str);
}
