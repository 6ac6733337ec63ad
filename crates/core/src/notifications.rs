//! Well-known notification and workflow event type names.
//!
//! Notification rows store one of these in their `notification_type`
//! column, and the live-push events on the bus carry the same tags.

/// A document was forwarded to its next stage; the new destinator is
/// notified.
pub const NOTIF_DOCUMENT_FORWARDED: &str = "document_forwarded";

/// A document was rejected back to its previous stage.
pub const NOTIF_DOCUMENT_REJECTED: &str = "document_rejected";
