//! Notification permission held for the server session.
//!
//! Prompts are broadcast to connected pages; the first answer (over HTTP or
//! WebSocket) settles every waiting request. A decided state never changes
//! for the rest of the session.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use notify_dispatcher::PermissionPrompt;
use serde_json::json;
use tokio::sync::{broadcast, watch};
use worker_protocol::Permission;

use crate::events;

pub struct PermissionBroker {
    state: watch::Sender<Permission>,
    answers: broadcast::Sender<Permission>,
    /// Serializes joining the waiters so exactly one request prompts.
    join: Mutex<()>,
    ws_tx: broadcast::Sender<String>,
}

impl PermissionBroker {
    pub fn new(initial: Permission, ws_tx: broadcast::Sender<String>) -> Self {
        let (state, _) = watch::channel(initial);
        let (answers, _) = broadcast::channel(16);
        Self {
            state,
            answers,
            join: Mutex::new(()),
            ws_tx,
        }
    }

    /// Record the user's answer to a prompt. Returns the resulting state.
    pub fn answer(&self, answer: Permission) -> Permission {
        let current = *self.state.borrow();
        if !current.is_undecided() {
            tracing::debug!(%current, %answer, "Permission already decided; answer ignored");
            return current;
        }

        if !answer.is_undecided() {
            self.state.send_replace(answer);
            let _ = self
                .ws_tx
                .send(events::envelope(events::PERMISSION_CHANGED, json!({ "permission": answer })));
        }
        // Wakes waiting prompts, including on dismissal.
        let _ = self.answers.send(answer);
        tracing::info!(permission = %answer, "Permission prompt answered");
        answer
    }

    /// Requests currently waiting for an answer.
    pub fn pending_requests(&self) -> usize {
        self.answers.receiver_count()
    }
}

#[async_trait]
impl PermissionPrompt for PermissionBroker {
    fn current(&self) -> Permission {
        *self.state.borrow()
    }

    async fn request(&self) -> Permission {
        // Subscribe before reading the state so an answer in between is seen.
        let (mut answers, first) = {
            let _join = self.join.lock().unwrap_or_else(PoisonError::into_inner);
            let answers = self.answers.subscribe();
            (answers, self.answers.receiver_count() == 1)
        };
        let current = self.current();
        if !current.is_undecided() {
            return current;
        }

        // One prompt on screen at a time; later requests share its answer.
        if !first {
            tracing::debug!("Permission prompt already open; waiting for its answer");
        } else if self
            .ws_tx
            .send(events::envelope(events::PERMISSION_PROMPT, json!({})))
            .is_err()
        {
            tracing::warn!("Permission prompt issued with no page connected");
        }

        match answers.recv().await {
            Ok(answer) => answer,
            Err(_) => self.current(),
        }
    }
}
