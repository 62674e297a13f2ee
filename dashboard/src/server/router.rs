use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(api::status::status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Notifications ---
        .route("/api/notifications", post(api::notifications::send_notification))
        .route(
            "/api/notifications/permission",
            get(api::notifications::get_permission).post(api::notifications::answer_permission),
        )
        .route(
            "/api/notifications/{id}/click",
            post(api::notifications::click_notification),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
