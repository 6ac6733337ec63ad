//! In-process workflow event bus.
//!
//! Transitions publish a [`WorkflowEvent`] after their transaction commits;
//! subscribers (the WebSocket notification pusher) deliver the best-effort
//! live signal. Durable notification rows are written inside the transition
//! transaction, never here.

pub mod bus;

pub use bus::{EventBus, WorkflowEvent};
