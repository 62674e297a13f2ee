//! Page → worker messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DEFAULT_TITLE, ProtocolError};

/// Messages the worker understands, keyed by their `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "SHOW_NOTIFICATION")]
    ShowNotification(NotificationRequest),
}

impl WorkerMessage {
    /// Decode a raw payload. Returns `None` for anything that is not a
    /// recognized message; callers treat that as a no-op.
    pub fn decode(payload: &Value) -> Option<Self> {
        match Self::deserialize(payload) {
            Ok(message) => Some(message),
            Err(e) => {
                let msg_type = payload
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<none>");
                tracing::debug!(msg_type, error = %e, "Ignoring unrecognized worker message");
                None
            }
        }
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<NotificationRequest> for WorkerMessage {
    fn from(request: NotificationRequest) -> Self {
        Self::ShowNotification(request)
    }
}

/// A request to show one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }

    /// Title to display: the request's title, or the fallback when it is
    /// absent or empty.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn display_body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}
