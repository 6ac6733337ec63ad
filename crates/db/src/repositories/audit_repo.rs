//! Repository for the append-only `audit_entries` table.

use sqlx::PgExecutor;
use parapheur_core::types::{DbId, Timestamp};

use crate::models::audit_entry::AuditEntry;

const COLUMNS: &str = "id, document_id, author_id, content, created_at";

/// Provides append and read operations for the audit trail. There are no
/// update or single-row delete operations on purpose.
pub struct AuditEntryRepo;

impl AuditEntryRepo {
    /// Append one entry to a document's trail.
    pub async fn append<'e>(
        executor: impl PgExecutor<'e>,
        document_id: DbId,
        author_id: DbId,
        content: &str,
    ) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_entries (document_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(document_id)
            .bind(author_id)
            .bind(content)
            .fetch_one(executor)
            .await
    }

    /// A document's trail in chronological order.
    pub async fn list_for_document<'e>(
        executor: impl PgExecutor<'e>,
        document_id: DbId,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_entries
             WHERE document_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(document_id)
            .fetch_all(executor)
            .await
    }

    /// Total number of entries for a document.
    pub async fn count_for_document<'e>(
        executor: impl PgExecutor<'e>,
        document_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(executor)
            .await
    }

    /// Number of entries created at or after a given instant. Drives the
    /// stage-completion check for the current hand-off.
    pub async fn count_since<'e>(
        executor: impl PgExecutor<'e>,
        document_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_entries
             WHERE document_id = $1 AND created_at >= $2",
        )
        .bind(document_id)
        .bind(since)
        .fetch_one(executor)
        .await
    }
}
