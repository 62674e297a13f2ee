//! Capabilities the host platform lends to the worker.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use worker_protocol::{DisplayedNotification, NotificationId};

use crate::WorkerError;
use crate::runtime::WorkerScope;

/// The host's notification display surface.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Render a notification. Activations should be reported back through
    /// `scope` so the worker can route the click.
    async fn show(
        &self,
        notification: &DisplayedNotification,
        scope: &WorkerScope,
    ) -> Result<(), WorkerError>;

    /// Dismiss a displayed notification.
    async fn close(&self, id: &NotificationId) -> Result<(), WorkerError>;
}

/// Identifier of an open page instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an open page as seen by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: ClientId,
    pub url: String,
    /// Whether the page is controlled by the active worker.
    pub controlled: bool,
    /// Whether the host can bring this page to the foreground.
    pub focusable: bool,
}

/// The host's set of open page instances.
#[async_trait]
pub trait WindowClients: Send + Sync {
    /// List open pages. Uncontrolled pages are included only on request.
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, WorkerError>;

    async fn focus(&self, id: &ClientId) -> Result<(), WorkerError>;

    async fn open_window(&self, url: &str) -> Result<(), WorkerError>;

    /// Take control of every open page without a reload. Must be idempotent.
    async fn claim(&self) -> Result<(), WorkerError>;
}

/// Host capabilities handed to a worker on registration.
#[derive(Clone)]
pub struct WorkerHost {
    pub surface: Arc<dyn NotificationSurface>,
    pub clients: Arc<dyn WindowClients>,
}

impl WorkerHost {
    pub fn new(surface: Arc<dyn NotificationSurface>, clients: Arc<dyn WindowClients>) -> Self {
        Self { surface, clients }
    }
}
