//! Worker event handlers: install, activate, message and notification click.

use serde_json::Value;
use worker_protocol::{APP_ROOT, DisplayedNotification, NotificationId, WorkerMessage};

use crate::WorkerError;
use crate::host::{ClientId, WorkerHost};
use crate::lifecycle::LifecycleState;
use crate::runtime::WorkerScope;

/// Outcome of routing one notification click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickRoute {
    Focused(ClientId),
    Opened,
}

/// One worker instance and its lifecycle state.
pub struct ServiceWorker {
    host: WorkerHost,
    scope: WorkerScope,
    state: LifecycleState,
}

impl ServiceWorker {
    pub fn new(host: WorkerHost, scope: WorkerScope) -> Self {
        Self {
            host,
            scope,
            state: LifecycleState::Installing,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn host(&self) -> &WorkerHost {
        &self.host
    }

    /// Install transition. Skips the waiting phase so this version takes
    /// over without waiting for open pages to close.
    pub fn install(&mut self) {
        self.state = LifecycleState::Installing;
        tracing::debug!("Background worker installing");
        self.skip_waiting();
    }

    fn skip_waiting(&mut self) {
        self.state = LifecycleState::Active;
        tracing::debug!("Background worker skipped waiting");
    }

    /// Activate transition: claim every open page. Safe to repeat.
    pub async fn activate(&mut self) -> Result<(), WorkerError> {
        if self.state == LifecycleState::Installing {
            self.skip_waiting();
        }
        self.host.clients.claim().await?;
        self.state = LifecycleState::Controlling;
        tracing::info!("Background worker controlling open pages");
        Ok(())
    }

    /// Handle a message posted by a page. Returns the shown notification,
    /// or `None` when the payload was ignored or the host refused it.
    pub async fn handle_message(&self, payload: &Value) -> Option<DisplayedNotification> {
        let WorkerMessage::ShowNotification(request) = WorkerMessage::decode(payload)?;
        let notification = DisplayedNotification::from_request(&request);

        match self.host.surface.show(&notification, &self.scope).await {
            Ok(()) => {
                tracing::info!(
                    id = %notification.id,
                    title = %notification.title,
                    "Notification shown"
                );
                Some(notification)
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification not shown");
                None
            }
        }
    }
}

/// Dismiss the notification, then focus an open application-root page or
/// open a new one. Exactly one of focus/open happens.
pub(crate) async fn route_click(
    host: &WorkerHost,
    id: &NotificationId,
) -> Result<ClickRoute, WorkerError> {
    if let Err(e) = host.surface.close(id).await {
        tracing::warn!(id = %id, error = %e, "Failed to dismiss notification");
    }

    let clients = host.clients.match_all(true).await?;
    if let Some(client) = clients
        .iter()
        .find(|client| client.focusable && is_app_root(&client.url))
    {
        host.clients.focus(&client.id).await?;
        tracing::info!(client_id = %client.id, "Focused existing dashboard window");
        return Ok(ClickRoute::Focused(client.id.clone()));
    }

    host.clients.open_window(APP_ROOT).await?;
    tracing::info!("Opened new dashboard window");
    Ok(ClickRoute::Opened)
}

/// Whether a page location points at the application root. Absolute URLs
/// are compared by path; query and fragment are ignored.
pub fn is_app_root(location: &str) -> bool {
    let location = location.trim();
    if let Ok(url) = url::Url::parse(location) {
        return url.has_host() && url.path() == APP_ROOT;
    }
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path == APP_ROOT
}
