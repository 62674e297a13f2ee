//! Notifications as rendered by the worker.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{NOTIFICATION_BADGE, NOTIFICATION_ICON, NotificationRequest};

/// Identifier assigned to a notification when it is shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A notification handed to the host's display surface.
///
/// `icon` and `badge` are fixed resources and cannot be chosen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
}

impl DisplayedNotification {
    pub fn from_request(request: &NotificationRequest) -> Self {
        Self {
            id: NotificationId::generate(),
            title: request.display_title().to_string(),
            body: request.display_body().to_string(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
        }
    }
}
