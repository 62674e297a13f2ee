//! Page-side registration handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, watch};
use worker_protocol::WORKER_SCRIPT_PATH;

use crate::WorkerError;
use crate::host::WorkerHost;
use crate::lifecycle::RegistrationState;
use crate::runtime::{RunningWorker, StatePublisher, WorkerEvent, WorkerHandle};

/// Owns the page's worker registration.
///
/// At most one worker runs at a time. Registering again replaces the
/// running worker, so each posted message reaches exactly one handler.
#[derive(Clone)]
pub struct ServiceWorkerContainer {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    state_tx: Arc<watch::Sender<RegistrationState>>,
    generation: Arc<AtomicU64>,
    active: RwLock<Option<RunningWorker>>,
}

impl Default for ServiceWorkerContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceWorkerContainer {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(RegistrationState::Unregistered);
        Self {
            inner: Arc::new(ContainerInner {
                state_tx: Arc::new(state_tx),
                generation: Arc::new(AtomicU64::new(0)),
                active: RwLock::new(None),
            }),
        }
    }

    /// Current registration state.
    pub fn state(&self) -> RegistrationState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.inner.state_tx.subscribe()
    }

    /// Register (or update) the worker loaded from `script_url`.
    ///
    /// Returns once install and activate are queued; use [`Self::ready`] to
    /// wait for the worker to take control.
    pub async fn register(&self, script_url: &str, host: WorkerHost) -> Result<(), WorkerError> {
        if !is_root_relative(script_url) {
            let e = WorkerError::InvalidScriptPath(script_url.to_string());
            tracing::error!(error = %e, "Worker registration failed");
            self.inner
                .state_tx
                .send_replace(RegistrationState::Failed(e.to_string()));
            return Err(e);
        }

        let handle = {
            let mut active = self.inner.active.write().await;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner
                .state_tx
                .send_replace(RegistrationState::Installing);

            if let Some(previous) = active.take() {
                tracing::info!(
                    previous = previous.handle.generation(),
                    generation,
                    "Replacing background worker"
                );
                previous.retire();
            }

            let publisher =
                StatePublisher::new(self.inner.state_tx.clone(), self.inner.generation.clone(), generation);
            let running = RunningWorker::spawn(host, publisher);
            let handle = running.handle.clone();
            *active = Some(running);
            handle
        };

        run_lifecycle(&handle).await?;
        tracing::info!(script_url, generation = handle.generation(), "Worker registered");
        Ok(())
    }

    /// Re-run install and activate on the current worker.
    pub async fn update(&self) -> Result<(), WorkerError> {
        let handle = self.current_handle().await.ok_or(WorkerError::NotRegistered)?;
        run_lifecycle(&handle).await
    }

    /// Wait until the worker is active or controlling. Never resolves while
    /// nothing is registered; fails when registration failed.
    pub async fn ready(&self) -> Result<WorkerHandle, WorkerError> {
        let mut rx = self.subscribe();
        loop {
            let settled = rx
                .wait_for(RegistrationState::is_settled)
                .await
                .map_err(|_| WorkerError::Closed)?
                .clone();

            if let RegistrationState::Failed(reason) = settled {
                return Err(WorkerError::Registration(reason));
            }
            if let Some(handle) = self.current_handle().await {
                return Ok(handle);
            }
            // Unregistered between the state change and the lookup.
        }
    }

    /// Stop the worker and forget the registration.
    pub async fn unregister(&self) {
        let mut active = self.inner.active.write().await;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(running) = active.take() {
            running.retire();
            tracing::info!("Worker unregistered");
        }
        self.inner
            .state_tx
            .send_replace(RegistrationState::Unregistered);
    }

    async fn current_handle(&self) -> Option<WorkerHandle> {
        self.inner
            .active
            .read()
            .await
            .as_ref()
            .map(|running| running.handle.clone())
    }
}

async fn run_lifecycle(handle: &WorkerHandle) -> Result<(), WorkerError> {
    handle.send(WorkerEvent::Install).await?;
    handle.send(WorkerEvent::Activate).await
}

fn is_root_relative(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}

/// Register the dashboard worker at its fixed script path.
pub async fn register_default(
    container: &ServiceWorkerContainer,
    host: WorkerHost,
) -> Result<(), WorkerError> {
    container.register(WORKER_SCRIPT_PATH, host).await
}
