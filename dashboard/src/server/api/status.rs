use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;

/// GET /status
pub async fn status_handler(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "registration": state.container().state(),
        "permission": state.dispatcher().permission(),
        "capabilities": state.dispatcher().capabilities(),
        "pages": state.pages().len().await,
    }))
}
