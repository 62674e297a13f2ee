//! Foreground side of the notification protocol.
//!
//! Gates notification permission and forwards display requests to the
//! background worker. Nothing here fails loudly: every failure is logged or
//! replaced by a visible fallback, and callers only see a [`DispatchOutcome`].

pub mod dispatcher;
pub mod permission;

use std::time::Duration;

use serde::Serialize;

pub use dispatcher::Dispatcher;
pub use permission::{FallbackAlert, PermissionPrompt};

/// Alert shown when the host cannot display notifications at all.
pub const UNSUPPORTED_MESSAGE: &str = "Notifications not supported in this browser.";

/// What happened to one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Handed to the worker; display is up to the worker and host.
    Posted,
    /// The user denied permission; nothing was sent.
    PermissionDenied,
    /// The prompt was dismissed or timed out; nothing was sent.
    PermissionPending,
    /// The host lacks worker or notification support; the fallback alert
    /// was shown instead.
    Unsupported,
    /// The worker never became ready or refused the message.
    Dropped,
}

/// What the host environment supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostCapabilities {
    pub workers: bool,
    pub notifications: bool,
}

impl HostCapabilities {
    pub fn full() -> Self {
        Self {
            workers: true,
            notifications: true,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.workers && self.notifications
    }
}

/// Optional bounds on the dispatcher's waits. `None` waits forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub ready_timeout: Option<Duration>,
    pub permission_timeout: Option<Duration>,
}
