use async_trait::async_trait;
use notify_dispatcher::FallbackAlert;
use serde_json::json;
use tokio::sync::broadcast;

use crate::events;

/// Fallback alert broadcast to every connected page.
pub struct PageAlert {
    ws_tx: broadcast::Sender<String>,
}

impl PageAlert {
    pub fn new(ws_tx: broadcast::Sender<String>) -> Self {
        Self { ws_tx }
    }
}

#[async_trait]
impl FallbackAlert for PageAlert {
    async fn alert(&self, message: &str) {
        tracing::warn!(message, "Showing fallback alert");
        let payload = events::envelope(events::ALERT, json!({ "message": message }));
        if self.ws_tx.send(payload).is_err() {
            tracing::warn!("No page connected to show the alert");
        }
    }
}
