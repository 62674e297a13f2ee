use std::sync::Arc;

use notify_dispatcher::{Dispatcher, HostCapabilities};
use service_worker::{ServiceWorkerContainer, WorkerHost};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::host::{DesktopSurface, PageAlert, PageRegistry, PermissionBroker};

/// Application shared state accessible from axum handlers and background
/// tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    config: AppConfig,
    container: ServiceWorkerContainer,
    dispatcher: Dispatcher,
    pages: Arc<PageRegistry>,
    permission: Arc<PermissionBroker>,
    surface: Arc<DesktopSurface>,
    shutdown_token: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let (ws_tx, _) = broadcast::channel(256);

        let capabilities = HostCapabilities {
            workers: config.worker_enabled,
            notifications: config.notifications_enabled && DesktopSurface::is_supported(),
        };
        let container = ServiceWorkerContainer::new();
        let pages = Arc::new(PageRegistry::new(config.base_url(), config.open_browser));
        let permission = Arc::new(PermissionBroker::new(
            config.initial_permission,
            ws_tx.clone(),
        ));
        let surface = Arc::new(DesktopSurface::new(
            config.app_name.clone(),
            config.assets_dir.clone(),
        ));
        let dispatcher = Dispatcher::new(
            container.clone(),
            permission.clone(),
            Arc::new(PageAlert::new(ws_tx.clone())),
            capabilities,
        )
        .with_config(config.dispatcher_config());

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config,
                container,
                dispatcher,
                pages,
                permission,
                surface,
                shutdown_token: CancellationToken::new(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn container(&self) -> &ServiceWorkerContainer {
        &self.inner.container
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn pages(&self) -> &Arc<PageRegistry> {
        &self.inner.pages
    }

    pub fn permission(&self) -> &PermissionBroker {
        &self.inner.permission
    }

    pub fn surface(&self) -> &DesktopSurface {
        &self.inner.surface
    }

    /// Host capabilities lent to the background worker.
    pub fn worker_host(&self) -> WorkerHost {
        WorkerHost::new(self.inner.surface.clone(), self.inner.pages.clone())
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }
}
