//! Audit entry (commentaire) model.

use serde::Serialize;
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// An append-only annotation tied to a document and its author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub document_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}
