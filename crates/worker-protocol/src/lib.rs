//! Wire types shared by the dashboard page and its background worker.
//!
//! Messages cross the page/worker boundary as JSON and are decoded into a
//! tagged union on receipt; anything without a recognized `type` tag is
//! dropped without error.

pub mod message;
pub mod notification;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use message::{NotificationRequest, WorkerMessage};
pub use notification::{DisplayedNotification, NotificationId};

/// Tag carried by show-notification requests.
pub const SHOW_NOTIFICATION: &str = "SHOW_NOTIFICATION";

/// Root-relative path the host loads as the worker's source.
pub const WORKER_SCRIPT_PATH: &str = "/sw.js";

/// Canonical "home" location used for focus-or-open click routing.
pub const APP_ROOT: &str = "/";

/// Icon attached to every displayed notification.
pub const NOTIFICATION_ICON: &str = "/icons/icon-192.png";

/// Badge attached to every displayed notification.
pub const NOTIFICATION_BADGE: &str = "/icons/icon-192.png";

/// Title used when a request carries no (or an empty) title.
pub const DEFAULT_TITLE: &str = "Notification";

/// Errors raised while encoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown permission state: {0}")]
    UnknownPermission(String),
}

/// User consent for displaying notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Default => "default",
        }
    }

    /// Whether the user has not decided yet and a prompt may be shown.
    pub fn is_undecided(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            "default" | "" => Ok(Self::Default),
            other => Err(ProtocolError::UnknownPermission(other.to_string())),
        }
    }
}
