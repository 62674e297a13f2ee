use std::sync::Arc;

use service_worker::{ServiceWorkerContainer, WorkerHandle};
use worker_protocol::{NotificationRequest, Permission, WorkerMessage};

use crate::permission::{FallbackAlert, PermissionPrompt};
use crate::{DispatchOutcome, DispatcherConfig, HostCapabilities, UNSUPPORTED_MESSAGE};

/// Decides whether a notification may be requested and forwards it to the
/// background worker.
#[derive(Clone)]
pub struct Dispatcher {
    container: ServiceWorkerContainer,
    permission: Arc<dyn PermissionPrompt>,
    alert: Arc<dyn FallbackAlert>,
    capabilities: HostCapabilities,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        container: ServiceWorkerContainer,
        permission: Arc<dyn PermissionPrompt>,
        alert: Arc<dyn FallbackAlert>,
        capabilities: HostCapabilities,
    ) -> Self {
        Self {
            container,
            permission,
            alert,
            capabilities,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn permission(&self) -> Permission {
        self.permission.current()
    }

    /// Return the current permission, prompting only while undecided.
    pub async fn ensure_permission(&self) -> Permission {
        let current = self.permission.current();
        if !current.is_undecided() {
            return current;
        }

        tracing::info!("Requesting notification permission");
        let decided = match self.config.permission_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.permission.request()).await {
                Ok(permission) => permission,
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = limit.as_secs(),
                        "Permission prompt timed out"
                    );
                    Permission::Default
                }
            },
            None => self.permission.request().await,
        };
        tracing::info!(permission = %decided, "Notification permission decided");
        decided
    }

    /// Page-load hook: ask for permission once if it is not granted yet.
    /// Returns `None` when nothing had to be asked.
    pub async fn request_on_load(&self) -> Option<Permission> {
        if !self.capabilities.notifications || self.permission.current() == Permission::Granted {
            return None;
        }
        let permission = self.ensure_permission().await;
        tracing::info!("Notification permission: {permission}");
        Some(permission)
    }

    /// Forward `request` to the worker. Fire-and-forget.
    pub async fn dispatch(&self, request: NotificationRequest) -> DispatchOutcome {
        if !self.capabilities.is_supported() {
            tracing::warn!(
                workers = self.capabilities.workers,
                notifications = self.capabilities.notifications,
                "Notifications unsupported; showing fallback alert"
            );
            self.alert.alert(UNSUPPORTED_MESSAGE).await;
            return DispatchOutcome::Unsupported;
        }

        match self.ensure_permission().await {
            Permission::Granted => {}
            Permission::Denied => {
                tracing::info!("Notification permission denied; request not sent");
                return DispatchOutcome::PermissionDenied;
            }
            Permission::Default => {
                tracing::info!("Notification permission undecided; request not sent");
                return DispatchOutcome::PermissionPending;
            }
        }

        let worker = match self.wait_ready().await {
            Some(worker) => worker,
            None => return DispatchOutcome::Dropped,
        };

        let payload = match WorkerMessage::from(request).to_value() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode notification request");
                return DispatchOutcome::Dropped;
            }
        };

        match worker.post_message(payload) {
            Ok(()) => {
                tracing::debug!(generation = worker.generation(), "Notification request posted");
                DispatchOutcome::Posted
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification request dropped");
                DispatchOutcome::Dropped
            }
        }
    }

    async fn wait_ready(&self) -> Option<WorkerHandle> {
        let ready = match self.config.ready_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.container.ready()).await {
                Ok(ready) => ready,
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = limit.as_secs(),
                        state = self.container.state().as_str(),
                        "Worker not ready in time; notification dropped"
                    );
                    return None;
                }
            },
            None => self.container.ready().await,
        };

        match ready {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::error!(error = %e, "SW registration failed");
                None
            }
        }
    }
}
