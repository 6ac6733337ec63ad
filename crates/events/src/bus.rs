//! Broadcast bus for workflow transition events.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application. The
//! bus is fire-and-forget: if no subscriber is listening an event is
//! dropped, which is acceptable because durability is handled by the
//! notification rows written inside the transition transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use parapheur_core::types::DbId;

/// A workflow transition that already committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Event tag, e.g. `"document_forwarded"` or `"document_rejected"`.
    pub event_type: String,

    /// The document the transition acted on.
    pub document_id: DbId,

    /// The user that triggered the transition.
    pub actor_user_id: DbId,

    /// The user that should be pushed to (the new destinator), if any.
    pub target_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl WorkflowEvent {
    /// Create a new event for a document transition.
    pub fn new(event_type: impl Into<String>, document_id: DbId, actor_user_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            document_id,
            actor_user_id,
            target_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the user the live push should reach.
    pub fn with_target(mut self, user_id: DbId) -> Self {
        self.target_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for [`WorkflowEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A `SendError` only means there are zero receivers; the push channel
    /// is best-effort so that is not an error here.
    pub fn publish(&self, event: WorkflowEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
