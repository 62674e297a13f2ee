use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use worker_protocol::{DisplayedNotification, NotificationId};

use crate::{ClientId, NotificationSurface, WindowClient, WindowClients, WorkerError, WorkerHost, WorkerScope};

mod worker;

/// Surface that records what it was asked to show.
#[derive(Default)]
struct RecordingSurface {
    shown: Mutex<Vec<DisplayedNotification>>,
    closed: Mutex<Vec<NotificationId>>,
    scope: Mutex<Option<WorkerScope>>,
    refuse: bool,
}

impl RecordingSurface {
    fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    fn shown(&self) -> Vec<DisplayedNotification> {
        self.shown.lock().unwrap().clone()
    }

    fn closed(&self) -> Vec<NotificationId> {
        self.closed.lock().unwrap().clone()
    }

    /// Simulate the user activating a notification.
    fn click(&self, id: &NotificationId) {
        let scope = self.scope.lock().unwrap().clone().expect("a notification was shown");
        scope.report_click(id.clone()).unwrap();
    }
}

#[async_trait]
impl NotificationSurface for RecordingSurface {
    async fn show(
        &self,
        notification: &DisplayedNotification,
        scope: &WorkerScope,
    ) -> Result<(), WorkerError> {
        if self.refuse {
            return Err(WorkerError::Host("permission not granted".into()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        *self.scope.lock().unwrap() = Some(scope.clone());
        Ok(())
    }

    async fn close(&self, id: &NotificationId) -> Result<(), WorkerError> {
        self.closed.lock().unwrap().push(id.clone());
        Ok(())
    }
}

/// In-memory page list.
#[derive(Default)]
struct FakeClients {
    clients: Mutex<Vec<WindowClient>>,
    focused: Mutex<Vec<ClientId>>,
    opened: Mutex<Vec<String>>,
    claims: AtomicUsize,
    fail_claim: bool,
}

impl FakeClients {
    fn with_pages(pages: &[(&str, &str, bool)]) -> Self {
        let clients = pages
            .iter()
            .map(|(id, url, controlled)| WindowClient {
                id: ClientId::new(*id),
                url: (*url).to_string(),
                controlled: *controlled,
                focusable: true,
            })
            .collect();
        Self {
            clients: Mutex::new(clients),
            ..Self::default()
        }
    }

    fn failing_claim() -> Self {
        Self {
            fail_claim: true,
            ..Self::default()
        }
    }

    fn focused(&self) -> Vec<ClientId> {
        self.focused.lock().unwrap().clone()
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WindowClients for FakeClients {
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, WorkerError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| include_uncontrolled || c.controlled)
            .cloned()
            .collect())
    }

    async fn focus(&self, id: &ClientId) -> Result<(), WorkerError> {
        self.focused.lock().unwrap().push(id.clone());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), WorkerError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn claim(&self) -> Result<(), WorkerError> {
        if self.fail_claim {
            return Err(WorkerError::Host("claim rejected".into()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        for client in self.clients.lock().unwrap().iter_mut() {
            client.controlled = true;
        }
        Ok(())
    }
}

fn host(surface: &Arc<RecordingSurface>, clients: &Arc<FakeClients>) -> WorkerHost {
    WorkerHost::new(surface.clone(), clients.clone())
}

/// Poll `condition` until it holds or a second passes.
async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
