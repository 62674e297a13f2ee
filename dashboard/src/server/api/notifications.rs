//! Notification API: the dashboard's "Send Notification" button, the
//! permission prompt, and click reporting for hosts without native actions.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;
use worker_protocol::{NotificationId, NotificationRequest, Permission};

use super::{ApiResult, err_json};
use crate::app::SharedState;

/// Title sent by the dashboard's notification button.
pub const BUTTON_TITLE: &str = "Admin Alert";
/// Body sent by the dashboard's notification button.
pub const BUTTON_BODY: &str = "You clicked the notification button!";

#[derive(Debug, Default, Deserialize)]
pub struct SendNotificationBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl SendNotificationBody {
    /// A bare button press carries neither field and sends the button text.
    pub fn into_request(self) -> NotificationRequest {
        match (self.title, self.body) {
            (None, None) => NotificationRequest::new(BUTTON_TITLE, BUTTON_BODY),
            (title, body) => NotificationRequest { title, body },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PermissionAnswer {
    pub permission: Permission,
}

/// POST /api/notifications
pub async fn send_notification(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        SendNotificationBody::default()
    } else {
        serde_json::from_slice::<SendNotificationBody>(&body)
            .map_err(|e| err_json(400, &format!("Invalid notification body: {e}")))?
    };

    let outcome = state.dispatcher().dispatch(payload.into_request()).await;
    Ok(Json(json!({ "status": "ok", "outcome": outcome })))
}

/// GET /api/notifications/permission
pub async fn get_permission(State(state): State<SharedState>) -> ApiResult {
    Ok(Json(json!({
        "status": "ok",
        "permission": state.dispatcher().permission(),
    })))
}

/// POST /api/notifications/permission
pub async fn answer_permission(
    State(state): State<SharedState>,
    Json(answer): Json<PermissionAnswer>,
) -> ApiResult {
    let permission = state.permission().answer(answer.permission);
    Ok(Json(json!({ "status": "ok", "permission": permission })))
}

/// POST /api/notifications/{id}/click
pub async fn click_notification(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = NotificationId::from(id);
    if !state.surface().is_displayed(&id) {
        return Err(err_json(404, "Notification not found"));
    }
    if !state.surface().click(&id) {
        return Err(err_json(409, "Click already handled or worker unavailable"));
    }
    Ok(Json(json!({ "status": "ok", "id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn state_without_notifications() -> SharedState {
        SharedState::new(AppConfig {
            notifications_enabled: false,
            open_browser: false,
            ..AppConfig::default()
        })
    }

    #[test]
    fn empty_body_sends_button_text() {
        let request = SendNotificationBody::default().into_request();
        assert_eq!(request, NotificationRequest::new(BUTTON_TITLE, BUTTON_BODY));
    }

    #[test]
    fn partial_body_is_passed_through() {
        let body: SendNotificationBody = serde_json::from_str(r#"{"title":"Fire drill"}"#).unwrap();
        let request = body.into_request();
        assert_eq!(request.title.as_deref(), Some("Fire drill"));
        assert_eq!(request.body, None);
    }

    #[test]
    fn permission_answer_parses_lowercase() {
        let answer: PermissionAnswer = serde_json::from_str(r#"{"permission":"denied"}"#).unwrap();
        assert_eq!(answer.permission, Permission::Denied);
    }

    #[tokio::test]
    async fn unsupported_host_alerts_instead_of_posting() {
        let state = state_without_notifications();
        let mut pages = state.subscribe_ws();

        let Json(reply) = send_notification(State(state), Bytes::new()).await.unwrap();
        assert_eq!(reply["outcome"], "unsupported");

        let alert = pages.recv().await.unwrap();
        assert!(alert.contains("Notifications not supported in this browser."));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let state = state_without_notifications();
        let (status, _) = send_notification(State(state), Bytes::from_static(b"{not json"))
            .await
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answered_permission_is_reported() {
        let state = state_without_notifications();
        let answer = PermissionAnswer { permission: Permission::Granted };

        let Json(answered) = answer_permission(State(state.clone()), Json(answer)).await.unwrap();
        assert_eq!(answered["permission"], "granted");
        let Json(reply) = get_permission(State(state)).await.unwrap();
        assert_eq!(reply["permission"], "granted");
    }

    #[tokio::test]
    async fn click_on_unknown_notification_is_not_found() {
        let state = state_without_notifications();
        let (status, _) = click_notification(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    }
}
