//! Open dashboard pages, seen by the worker as window clients.

use std::collections::HashMap;
use std::process::Command;

use async_trait::async_trait;
use serde_json::json;
use service_worker::{ClientId, WindowClient, WindowClients, WorkerError};
use tokio::sync::{RwLock, mpsc};

use crate::events;

struct Page {
    url: String,
    controlled: bool,
    tx: mpsc::UnboundedSender<String>,
}

/// Registry of connected pages. Each WebSocket connection is one page.
pub struct PageRegistry {
    pages: RwLock<HashMap<ClientId, Page>>,
    base_url: String,
    open_browser: bool,
}

impl PageRegistry {
    pub fn new(base_url: String, open_browser: bool) -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            base_url,
            open_browser,
        }
    }

    /// Register a page at `url`. Pages start uncontrolled until the worker
    /// claims them.
    pub async fn connect(&self, url: &str) -> (ClientId, mpsc::UnboundedReceiver<String>) {
        let id = ClientId::new(uuid::Uuid::new_v4().to_string());
        let (tx, rx) = mpsc::unbounded_channel();
        self.pages.write().await.insert(
            id.clone(),
            Page {
                url: url.to_string(),
                controlled: false,
                tx,
            },
        );
        tracing::info!(client_id = %id, url, "Page connected");
        (id, rx)
    }

    pub async fn disconnect(&self, id: &ClientId) {
        if self.pages.write().await.remove(id).is_some() {
            tracing::info!(client_id = %id, "Page disconnected");
        }
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    /// Send a raw message to a single page.
    pub async fn send_to(&self, id: &ClientId, message: String) -> bool {
        match self.pages.read().await.get(id) {
            Some(page) => page.tx.send(message).is_ok(),
            None => false,
        }
    }

    fn launch_browser(url: &str) -> std::io::Result<()> {
        #[cfg(target_os = "macos")]
        let mut cmd = Command::new("open");
        #[cfg(target_os = "windows")]
        let mut cmd = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        };
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut cmd = Command::new("xdg-open");

        cmd.arg(url).spawn().map(|_| ())
    }
}

#[async_trait]
impl WindowClients for PageRegistry {
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, WorkerError> {
        let pages = self.pages.read().await;
        Ok(pages
            .iter()
            .filter(|(_, page)| include_uncontrolled || page.controlled)
            .map(|(id, page)| WindowClient {
                id: id.clone(),
                url: page.url.clone(),
                controlled: page.controlled,
                focusable: !page.tx.is_closed(),
            })
            .collect())
    }

    async fn focus(&self, id: &ClientId) -> Result<(), WorkerError> {
        let message = events::envelope(events::FOCUS, json!({}));
        if self.send_to(id, message).await {
            Ok(())
        } else {
            Err(WorkerError::Host(format!("page {id} is gone")))
        }
    }

    async fn open_window(&self, url: &str) -> Result<(), WorkerError> {
        let target = format!("{}{}", self.base_url, url);
        if !self.open_browser {
            tracing::info!(target = %target, "Browser launch disabled; not opening window");
            return Ok(());
        }
        Self::launch_browser(&target)
            .map_err(|e| WorkerError::Host(format!("failed to open {target}: {e}")))?;
        tracing::info!(target = %target, "Opened browser window");
        Ok(())
    }

    async fn claim(&self) -> Result<(), WorkerError> {
        let mut pages = self.pages.write().await;
        let message = events::envelope(events::CONTROLLER_CHANGE, json!({}));
        let mut claimed = 0usize;
        for page in pages.values_mut().filter(|page| !page.controlled) {
            page.controlled = true;
            let _ = page.tx.send(message.clone());
            claimed += 1;
        }
        tracing::debug!(claimed, "Pages claimed by worker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PageRegistry {
        PageRegistry::new("http://localhost:8080".into(), false)
    }

    #[tokio::test]
    async fn new_pages_are_uncontrolled_until_claimed() {
        let pages = registry();
        let (id, mut rx) = pages.connect("/").await;

        assert!(pages.match_all(false).await.unwrap().is_empty());
        let all = pages.match_all(true).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert!(!all[0].controlled);

        pages.claim().await.unwrap();
        assert_eq!(pages.match_all(false).await.unwrap().len(), 1);
        assert!(rx.recv().await.unwrap().contains(events::CONTROLLER_CHANGE));
    }

    #[tokio::test]
    async fn claim_is_idempotent() {
        let pages = registry();
        let (_id, mut rx) = pages.connect("/").await;
        pages.claim().await.unwrap();
        pages.claim().await.unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn focus_reaches_the_page() {
        let pages = registry();
        let (id, mut rx) = pages.connect("/").await;

        pages.focus(&id).await.unwrap();
        assert!(rx.recv().await.unwrap().contains(events::FOCUS));
    }

    #[tokio::test]
    async fn focus_on_disconnected_page_fails() {
        let pages = registry();
        let (id, _rx) = pages.connect("/").await;
        pages.disconnect(&id).await;

        assert!(pages.focus(&id).await.is_err());
        assert_eq!(pages.len().await, 0);
    }

    #[tokio::test]
    async fn open_window_without_browser_launch_succeeds() {
        assert!(registry().open_window("/").await.is_ok());
    }
}
