//! Event-to-WebSocket push service.
//!
//! [`NotificationPusher`] subscribes to the workflow event bus and forwards
//! each committed transition to the target user's active connections. It is
//! fire-and-forget by design: a missing or broken connection never affects
//! the transition that produced the event.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use parapheur_events::WorkflowEvent;

use crate::ws::WsManager;

/// Pushes committed workflow events to connected users.
pub struct NotificationPusher {
    ws_manager: Arc<WsManager>,
}

impl NotificationPusher {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the push loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](parapheur_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<WorkflowEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.push(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification pusher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification pusher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event to its target user, if any.
    async fn push(&self, event: &WorkflowEvent) {
        let Some(target) = event.target_user_id else {
            return;
        };

        let msg = serde_json::json!({
            "type": "notification",
            "event_type": event.event_type,
            "document_id": event.document_id,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });
        let sent = self
            .ws_manager
            .send_to_user(target, Message::Text(msg.to_string().into()))
            .await;
        tracing::debug!(
            event_type = %event.event_type,
            target_user_id = target,
            connections = sent,
            "Pushed workflow event"
        );
    }
}
