//! The worker task: a single event loop fed by a bounded channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use worker_protocol::NotificationId;

use crate::WorkerError;
use crate::host::WorkerHost;
use crate::lifecycle::RegistrationState;
use crate::worker::{ServiceWorker, route_click};

pub(crate) const EVENT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Install,
    Activate,
    Message(Value),
    NotificationClick(NotificationId),
}

/// Sending side of a running worker, held by pages.
///
/// Posting is fire-and-forget: no acknowledgement comes back.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    events: mpsc::Sender<WorkerEvent>,
    generation: u64,
}

impl WorkerHandle {
    /// Post a message to the worker.
    pub fn post_message(&self, payload: Value) -> Result<(), WorkerError> {
        self.try_send(WorkerEvent::Message(payload))
    }

    /// Registration generation this worker belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) async fn send(&self, event: WorkerEvent) -> Result<(), WorkerError> {
        self.events
            .send(event)
            .await
            .map_err(|_| WorkerError::Closed)
    }

    fn try_send(&self, event: WorkerEvent) -> Result<(), WorkerError> {
        self.events.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WorkerError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => WorkerError::Closed,
        })
    }
}

/// Handle given to the host surface so it can report notification
/// activations back to the worker that showed them.
#[derive(Debug, Clone)]
pub struct WorkerScope {
    events: mpsc::Sender<WorkerEvent>,
}

impl WorkerScope {
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<WorkerEvent>) {
        let (events, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        (Self { events }, rx)
    }

    /// Report a click on a displayed notification.
    pub fn report_click(&self, id: NotificationId) -> Result<(), WorkerError> {
        self.events
            .try_send(WorkerEvent::NotificationClick(id))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => WorkerError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => WorkerError::Closed,
            })
    }
}

/// Publishes lifecycle transitions for one registration generation.
/// Transitions from a retired worker are dropped.
#[derive(Clone)]
pub(crate) struct StatePublisher {
    tx: Arc<watch::Sender<RegistrationState>>,
    current: Arc<AtomicU64>,
    generation: u64,
}

impl StatePublisher {
    pub(crate) fn new(
        tx: Arc<watch::Sender<RegistrationState>>,
        current: Arc<AtomicU64>,
        generation: u64,
    ) -> Self {
        Self {
            tx,
            current,
            generation,
        }
    }

    fn publish(&self, state: RegistrationState) {
        if self.current.load(Ordering::SeqCst) != self.generation {
            tracing::debug!(
                generation = self.generation,
                state = state.as_str(),
                "Dropping state change from retired worker"
            );
            return;
        }
        self.tx.send_replace(state);
    }
}

/// A spawned worker task.
pub(crate) struct RunningWorker {
    pub(crate) handle: WorkerHandle,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningWorker {
    /// Spawn the worker loop.
    pub(crate) fn spawn(host: WorkerHost, publisher: StatePublisher) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>(EVENT_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let scope = WorkerScope {
            events: event_tx.clone(),
        };
        let worker = ServiceWorker::new(host, scope);
        let generation = publisher.generation;
        let task = tokio::spawn(run_loop(worker, event_rx, shutdown_rx, publisher));
        tracing::info!(generation, "Background worker started");

        Self {
            handle: WorkerHandle {
                events: event_tx,
                generation,
            },
            shutdown_tx,
            task,
        }
    }

    /// Ask the loop to stop. Events still queued are discarded.
    pub(crate) fn retire(self) {
        if self.shutdown_tx.try_send(()).is_err() {
            tracing::debug!("Worker already stopping; aborting task");
            self.task.abort();
        }
    }
}

async fn run_loop(
    mut worker: ServiceWorker,
    mut event_rx: mpsc::Receiver<WorkerEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
    publisher: StatePublisher,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::info!(generation = publisher.generation, "Background worker shutdown requested");
                break;
            }
            event = event_rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            WorkerEvent::Install => {
                publisher.publish(RegistrationState::Installing);
                worker.install();
                publisher.publish(worker.state().into());
            }
            WorkerEvent::Activate => {
                if let Err(e) = worker.activate().await {
                    tracing::error!(error = %e, "Background worker activation failed");
                    publisher.publish(RegistrationState::Failed(e.to_string()));
                    break;
                }
                publisher.publish(worker.state().into());
            }
            WorkerEvent::Message(payload) => {
                worker.handle_message(&payload).await;
            }
            WorkerEvent::NotificationClick(id) => {
                // Routing waits on the host; keep the loop free for messages.
                let host = worker.host().clone();
                tokio::spawn(async move {
                    if let Err(e) = route_click(&host, &id).await {
                        tracing::error!(id = %id, error = %e, "Notification click routing failed");
                    }
                });
            }
        }
    }

    tracing::info!(generation = publisher.generation, "Background worker stopped");
}
