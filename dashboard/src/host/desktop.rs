//! Desktop notification surface.
//!
//! On Linux notifications go to the session's notification server with a
//! default action; activating it is reported back to the worker. Other
//! platforms report themselves unsupported and the dispatcher falls back to
//! a page alert.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use service_worker::{NotificationSurface, WorkerError, WorkerScope};
use worker_protocol::{DisplayedNotification, NotificationId};

struct Entry<S> {
    scope: S,
    native_id: Option<u32>,
    clicked: bool,
}

/// Notifications on screen, keyed by the worker's notification id.
///
/// An entry exists from just before the native show until the worker closes
/// it or the notification server reports it closed. Only the first click on
/// an entry is reported.
struct Tracker<S> {
    entries: Mutex<HashMap<NotificationId, Entry<S>>>,
}

impl<S: Clone> Tracker<S> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn insert(&self, id: NotificationId, scope: S) {
        lock(&self.entries).insert(
            id,
            Entry {
                scope,
                native_id: None,
                clicked: false,
            },
        );
    }

    fn contains(&self, id: &NotificationId) -> bool {
        lock(&self.entries).contains_key(id)
    }

    /// Record the server-side id. Returns `false` when the notification was
    /// closed while it was being shown.
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn attach_native(&self, id: &NotificationId, native_id: u32) -> bool {
        match lock(&self.entries).get_mut(id) {
            Some(entry) => {
                entry.native_id = Some(native_id);
                true
            }
            None => false,
        }
    }

    /// Claim the click on `id`. `None` if unknown or already clicked.
    fn claim_click(&self, id: &NotificationId) -> Option<S> {
        let mut entries = lock(&self.entries);
        let entry = entries.get_mut(id)?;
        if entry.clicked {
            return None;
        }
        entry.clicked = true;
        Some(entry.scope.clone())
    }

    /// Forget `id`, returning the native id still to be dismissed.
    fn remove(&self, id: &NotificationId) -> Option<u32> {
        lock(&self.entries).remove(id).and_then(|entry| entry.native_id)
    }
}

pub struct DesktopSurface {
    app_name: String,
    assets_dir: PathBuf,
    displayed: Arc<Tracker<WorkerScope>>,
}

impl DesktopSurface {
    pub fn new(app_name: String, assets_dir: PathBuf) -> Self {
        Self {
            app_name,
            assets_dir,
            displayed: Arc::new(Tracker::new()),
        }
    }

    /// Whether this platform has a notification surface.
    pub fn is_supported() -> bool {
        cfg!(target_os = "linux")
    }

    pub fn is_displayed(&self, id: &NotificationId) -> bool {
        self.displayed.contains(id)
    }

    /// Report a click on a displayed notification to the worker that showed
    /// it. Returns `false` for unknown or already clicked notifications.
    pub fn click(&self, id: &NotificationId) -> bool {
        report_click(&self.displayed, id)
    }

    /// Map a root-relative resource path into the assets directory.
    fn resolve_resource(&self, path: &str) -> PathBuf {
        self.assets_dir.join(path.trim_start_matches('/'))
    }

    #[cfg(target_os = "linux")]
    async fn show_native(
        &self,
        notification: &DisplayedNotification,
        icon: &Path,
    ) -> Result<(), WorkerError> {
        let mut native = notify_rust::Notification::new();
        native
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.body)
            .action("default", "Open");
        if icon.exists() {
            native.icon(&icon.to_string_lossy());
        }

        let id = notification.id.clone();
        let displayed = self.displayed.clone();
        let (shown_tx, shown_rx) = tokio::sync::oneshot::channel();

        // The notification server is reached over a blocking D-Bus call and
        // the handle blocks until the notification is activated or closed.
        tokio::task::spawn_blocking(move || {
            let handle = match native.show() {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = shown_tx.send(Err(e.to_string()));
                    return;
                }
            };
            if !displayed.attach_native(&id, handle.id()) {
                handle.close();
                let _ = shown_tx.send(Ok(()));
                return;
            }
            let _ = shown_tx.send(Ok(()));

            handle.wait_for_action(|action| match action {
                "default" => {
                    report_click(&displayed, &id);
                }
                "__closed" => {
                    displayed.remove(&id);
                }
                other => tracing::debug!(action = other, "Ignoring notification action"),
            });
        });

        match shown_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(WorkerError::Host(e)),
            Err(_) => Err(WorkerError::Host("notification task ended".into())),
        }
    }

    #[cfg(not(target_os = "linux"))]
    async fn show_native(
        &self,
        notification: &DisplayedNotification,
        icon: &Path,
    ) -> Result<(), WorkerError> {
        tracing::info!(
            app = %self.app_name,
            title = %notification.title,
            body = %notification.body,
            icon = %icon.display(),
            "Desktop notification (no native surface)"
        );
        Ok(())
    }

    /// Dismiss a notification still on screen. Replacing it under its
    /// server id yields a handle that can close it; the original handle is
    /// held by the thread waiting for its action.
    #[cfg(target_os = "linux")]
    async fn close_native(&self, native_id: u32) -> Result<(), WorkerError> {
        let app_name = self.app_name.clone();
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(&app_name)
                .id(native_id)
                .show()
                .map(|handle| handle.close())
                .map_err(|e| WorkerError::Host(e.to_string()))
        })
        .await
        .map_err(|e| WorkerError::Host(e.to_string()))?
    }

    #[cfg(not(target_os = "linux"))]
    async fn close_native(&self, _native_id: u32) -> Result<(), WorkerError> {
        Ok(())
    }
}

fn report_click(displayed: &Tracker<WorkerScope>, id: &NotificationId) -> bool {
    let Some(scope) = displayed.claim_click(id) else {
        tracing::debug!(id = %id, "Click ignored; notification gone or already clicked");
        return false;
    };
    match scope.report_click(id.clone()) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "Click not delivered to worker");
            false
        }
    }
}

#[async_trait]
impl NotificationSurface for DesktopSurface {
    async fn show(
        &self,
        notification: &DisplayedNotification,
        scope: &WorkerScope,
    ) -> Result<(), WorkerError> {
        let icon = self.resolve_resource(&notification.icon);
        tracing::debug!(
            id = %notification.id,
            badge = %self.resolve_resource(&notification.badge).display(),
            "Badge has no desktop equivalent"
        );

        // Tracked before the server can report activity for it.
        self.displayed.insert(notification.id.clone(), scope.clone());
        if let Err(e) = self.show_native(notification, &icon).await {
            self.displayed.remove(&notification.id);
            return Err(e);
        }
        Ok(())
    }

    async fn close(&self, id: &NotificationId) -> Result<(), WorkerError> {
        match self.displayed.remove(id) {
            Some(native_id) => self.close_native(native_id).await,
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
