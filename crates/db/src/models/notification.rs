//! Notification entity model.

use serde::Serialize;
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    /// Tag identifying the triggering event, e.g. `document_rejected`.
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}
