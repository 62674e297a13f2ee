use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use service_worker::ClientId;
use tokio::task::JoinHandle;

use super::api::notifications::{PermissionAnswer, SendNotificationBody};
use crate::app::SharedState;
use crate::events;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Location of the connecting page, relative to the dashboard origin.
    #[serde(default = "default_page_url")]
    pub url: String,
}

fn default_page_url() -> String {
    "/".to_string()
}

/// WebSocket upgrade handler. Every connection is one dashboard page.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<PageQuery>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.url))
}

async fn handle_socket(socket: WebSocket, state: SharedState, url: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe_ws();
    let (client_id, mut page_rx) = state.pages().connect(&url).await;

    let welcome = events::envelope(
        events::CONNECTED,
        json!({
            "clientId": client_id,
            "permission": state.dispatcher().permission(),
            "registration": state.container().state(),
        }),
    );
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        state.pages().disconnect(&client_id).await;
        return;
    }

    let prompt_task = spawn_page_load_prompt(&state);

    // Forward broadcasts and page-directed messages to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                msg = rx.recv() => match msg {
                    Ok(msg) => msg,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WebSocket client lagged behind broadcasts");
                        continue;
                    }
                    Err(_) => break,
                },
                msg = page_rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_client_message(&text, &cid, &recv_state).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    prompt_task.abort();
    state.pages().disconnect(&client_id).await;
}

/// Page load asks for permission once, if it is still undecided. The caller
/// aborts the task when the page goes away.
fn spawn_page_load_prompt(state: &SharedState) -> JoinHandle<()> {
    let dispatcher = state.dispatcher().clone();
    tokio::spawn(async move {
        dispatcher.request_on_load().await;
    })
}

/// Route incoming page messages.
async fn handle_client_message(text: &str, client_id: &ClientId, state: &SharedState) {
    let Ok(msg) = serde_json::from_str::<Value>(text) else {
        tracing::debug!(client_id = %client_id, "Ignoring non-JSON page message");
        return;
    };
    let msg_type = msg.get("type").and_then(|t| t.as_str()).unwrap_or("");
    // Fields may sit under "data" or beside "type".
    let data = msg.get("data").cloned().unwrap_or_else(|| msg.clone());

    match msg_type {
        events::SEND_NOTIFICATION => {
            let body = match serde_json::from_value::<SendNotificationBody>(data) {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(client_id = %client_id, "Ignoring malformed send_notification: {}", e);
                    return;
                }
            };
            let dispatcher = state.dispatcher().clone();
            tokio::spawn(async move {
                let outcome = dispatcher.dispatch(body.into_request()).await;
                tracing::debug!(?outcome, "Page notification dispatched");
            });
        }
        events::PERMISSION_RESPONSE => match serde_json::from_value::<PermissionAnswer>(data) {
            Ok(answer) => {
                state.permission().answer(answer.permission);
            }
            Err(e) => {
                tracing::debug!(client_id = %client_id, "Ignoring malformed permission_response: {}", e);
            }
        },
        events::PING => {
            let pong = json!({ "type": events::PONG }).to_string();
            state.pages().send_to(client_id, pong).await;
        }
        other => {
            tracing::debug!(client_id = %client_id, msg_type = other, "Ignoring page message");
        }
    }
}
