use std::sync::Arc;

use serde_json::json;
use worker_protocol::{DEFAULT_TITLE, NOTIFICATION_BADGE, NOTIFICATION_ICON, NotificationId};

use super::{FakeClients, RecordingSurface, host};
use crate::worker::route_click;
use crate::{ClickRoute, ClientId, LifecycleState, ServiceWorker, WorkerScope, is_app_root};

fn worker(surface: &Arc<RecordingSurface>, clients: &Arc<FakeClients>) -> ServiceWorker {
    let (scope, _rx) = WorkerScope::detached();
    ServiceWorker::new(host(surface, clients), scope)
}

#[tokio::test]
async fn install_skips_waiting_and_activate_claims() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::with_pages(&[("a", "/", false)]));
    let mut sw = worker(&surface, &clients);

    sw.install();
    assert_eq!(sw.state(), LifecycleState::Active);

    sw.activate().await.unwrap();
    assert_eq!(sw.state(), LifecycleState::Controlling);
    assert_eq!(clients.claims(), 1);

    let pages = clients.clients.lock().unwrap().clone();
    assert!(pages.iter().all(|p| p.controlled));
}

#[tokio::test]
async fn activate_is_idempotent() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::default());
    let mut sw = worker(&surface, &clients);

    sw.install();
    sw.activate().await.unwrap();
    sw.activate().await.unwrap();
    assert_eq!(sw.state(), LifecycleState::Controlling);
}

#[tokio::test]
async fn activation_failure_is_reported() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::failing_claim());
    let mut sw = worker(&surface, &clients);

    sw.install();
    assert!(sw.activate().await.is_err());
    assert_eq!(sw.state(), LifecycleState::Active);
}

#[tokio::test]
async fn show_notification_applies_request_fields() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::default());
    let sw = worker(&surface, &clients);

    let shown = sw
        .handle_message(&json!({
            "type": "SHOW_NOTIFICATION",
            "title": "Admin Alert",
            "body": "You clicked the notification button!"
        }))
        .await
        .expect("notification shown");

    assert_eq!(shown.title, "Admin Alert");
    assert_eq!(shown.body, "You clicked the notification button!");
    assert_eq!(shown.icon, NOTIFICATION_ICON);
    assert_eq!(shown.badge, NOTIFICATION_BADGE);
    assert_eq!(surface.shown(), vec![shown]);
}

#[tokio::test]
async fn show_notification_applies_defaults() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::default());
    let sw = worker(&surface, &clients);

    sw.handle_message(&json!({ "type": "SHOW_NOTIFICATION", "title": "" }))
        .await
        .unwrap();
    sw.handle_message(&json!({ "type": "SHOW_NOTIFICATION" }))
        .await
        .unwrap();

    let shown = surface.shown();
    assert_eq!(shown.len(), 2);
    for notification in shown {
        assert_eq!(notification.title, DEFAULT_TITLE);
        assert_eq!(notification.body, "");
    }
}

#[tokio::test]
async fn unrecognized_messages_are_no_ops() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::default());
    let sw = worker(&surface, &clients);

    for payload in [
        json!({ "type": "PING" }),
        json!({ "title": "missing tag" }),
        json!({ "type": "SHOW_NOTIFICATION", "title": 42 }),
        json!(null),
        json!([1, 2, 3]),
    ] {
        assert!(sw.handle_message(&payload).await.is_none());
    }
    assert!(surface.shown().is_empty());
    assert!(clients.focused().is_empty());
    assert!(clients.opened().is_empty());
}

#[tokio::test]
async fn refused_display_is_swallowed() {
    let surface = Arc::new(RecordingSurface::refusing());
    let clients = Arc::new(FakeClients::default());
    let sw = worker(&surface, &clients);

    let shown = sw
        .handle_message(&json!({ "type": "SHOW_NOTIFICATION", "title": "x" }))
        .await;
    assert!(shown.is_none());
}

#[tokio::test]
async fn click_focuses_existing_root_window() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::with_pages(&[
        ("reports", "/reports", true),
        ("home", "http://localhost:8080/", true),
    ]));
    let id = NotificationId::from("n-1");

    let route = route_click(&host(&surface, &clients), &id).await.unwrap();

    assert_eq!(route, ClickRoute::Focused(ClientId::new("home")));
    assert_eq!(surface.closed(), vec![id]);
    assert_eq!(clients.focused(), vec![ClientId::new("home")]);
    assert!(clients.opened().is_empty());
}

#[tokio::test]
async fn click_considers_uncontrolled_windows() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::with_pages(&[("fresh", "/", false)]));

    let route = route_click(&host(&surface, &clients), &NotificationId::from("n"))
        .await
        .unwrap();

    assert_eq!(route, ClickRoute::Focused(ClientId::new("fresh")));
    assert!(clients.opened().is_empty());
}

#[tokio::test]
async fn click_opens_root_when_no_root_window() {
    let surface = Arc::new(RecordingSurface::default());
    let clients = Arc::new(FakeClients::with_pages(&[("reports", "/reports", true)]));

    let route = route_click(&host(&surface, &clients), &NotificationId::from("n"))
        .await
        .unwrap();

    assert_eq!(route, ClickRoute::Opened);
    assert!(clients.focused().is_empty());
    assert_eq!(clients.opened(), vec!["/".to_string()]);
}

#[tokio::test]
async fn click_does_exactly_one_action() {
    for pages in [
        vec![],
        vec![("a", "/", true)],
        vec![("a", "/", true), ("b", "/", true)],
        vec![("a", "/students", false)],
    ] {
        let surface = Arc::new(RecordingSurface::default());
        let clients = Arc::new(FakeClients::with_pages(&pages));
        route_click(&host(&surface, &clients), &NotificationId::from("n"))
            .await
            .unwrap();
        assert_eq!(clients.focused().len() + clients.opened().len(), 1);
    }
}

#[test]
fn app_root_matching() {
    assert!(is_app_root("/"));
    assert!(is_app_root("/?range=7"));
    assert!(is_app_root("/#charts"));
    assert!(is_app_root("http://localhost:8080/"));
    assert!(is_app_root("https://school.example"));
    assert!(!is_app_root("/reports"));
    assert!(!is_app_root("http://localhost:8080/reports"));
    assert!(!is_app_root(""));
}
