//! Background worker that renders dashboard notifications.
//!
//! The worker runs as its own tokio task and is reached only through a
//! bounded message channel. It owns its lifecycle (install, activate), shows
//! notifications for `SHOW_NOTIFICATION` messages and routes notification
//! clicks to an application window. Pages reach it through a
//! [`ServiceWorkerContainer`].

pub mod container;
pub mod host;
pub mod lifecycle;
mod runtime;
pub mod worker;
#[cfg(test)]
mod tests;

pub use container::{ServiceWorkerContainer, register_default};
pub use host::{ClientId, NotificationSurface, WindowClient, WindowClients, WorkerHost};
pub use lifecycle::{LifecycleState, RegistrationState};
pub use runtime::{WorkerHandle, WorkerScope};
pub use worker::{ClickRoute, ServiceWorker, is_app_root};

/// Errors surfaced by the worker or its host.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker registration failed: {0}")]
    Registration(String),

    #[error("Invalid worker script path: {0}")]
    InvalidScriptPath(String),

    #[error("No worker registered")]
    NotRegistered,

    #[error("Worker is not running")]
    Closed,

    #[error("Worker message queue full")]
    QueueFull,

    #[error("Host platform error: {0}")]
    Host(String),
}
