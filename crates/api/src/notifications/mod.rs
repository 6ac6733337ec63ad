//! Live notification push.
//!
//! The durable notification row is written inside the transition
//! transaction; [`NotificationPusher`] only handles the best-effort
//! WebSocket signal on top.

pub mod pusher;

pub use pusher::NotificationPusher;
