//! WebSocket message types exchanged with dashboard pages.

// -- Server → page --

pub const CONNECTED: &str = "connected";
pub const PERMISSION_PROMPT: &str = "permission_prompt";
pub const PERMISSION_CHANGED: &str = "permission_changed";
pub const CONTROLLER_CHANGE: &str = "controllerchange";
pub const FOCUS: &str = "focus";
pub const ALERT: &str = "alert";
pub const PONG: &str = "pong";

// -- Page → server --

pub const SEND_NOTIFICATION: &str = "send_notification";
pub const PERMISSION_RESPONSE: &str = "permission_response";
pub const PING: &str = "ping";

/// Build a `{ "type": …, "data": … }` envelope.
pub fn envelope(msg_type: &str, data: serde_json::Value) -> String {
    serde_json::json!({ "type": msg_type, "data": data }).to_string()
}
