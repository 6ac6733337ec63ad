//! Repository for the `documents` table.
//!
//! Transition writes go through [`DocumentRepo::apply_transition`], which
//! asserts the optimistic version read at the start of the engine
//! transaction. A `None` return means another transition won the race.

use sqlx::PgExecutor;
use parapheur_core::types::DbId;

use crate::models::document::{Document, TransitionUpdate};

const COLUMNS: &str = "id, title, template_id, current_stage_id, status, transfer_status, \
    destinator_name, transfer_timestamp, version, created_at, updated_at";

/// Provides CRUD and transition operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document at its entry stage (pending/pending).
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        title: &str,
        template_id: DbId,
        current_stage_id: Option<DbId>,
        destinator_name: Option<&str>,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (title, template_id, current_stage_id, destinator_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(title)
            .bind(template_id)
            .bind(current_stage_id)
            .bind(destinator_name)
            .fetch_one(executor)
            .await
    }

    /// Find a document by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Apply a transition's full state change in one statement, guarded by
    /// the optimistic version check. The hand-off timestamp comes from the
    /// database `now()`, so it is comparable to audit `created_at` stamps.
    ///
    /// Returns the updated row, or `None` when `expected_version` is stale
    /// (a concurrent transition committed first).
    pub async fn apply_transition<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected_version: i64,
        update: &TransitionUpdate,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                current_stage_id = $3,
                status = $4,
                transfer_status = $5,
                destinator_name = $6,
                transfer_timestamp = now(),
                version = version + 1,
                updated_at = now()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(update.current_stage_id)
            .bind(&update.status)
            .bind(&update.transfer_status)
            .bind(&update.destinator_name)
            .fetch_optional(executor)
            .await
    }

    /// Advance only the delivery state (and recomputed review status) of
    /// the current hand-off, with the same version guard.
    pub async fn advance_transfer<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected_version: i64,
        transfer_status: &str,
        status: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                transfer_status = $3,
                status = $4,
                version = version + 1,
                updated_at = now()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(transfer_status)
            .bind(status)
            .fetch_optional(executor)
            .await
    }

    /// List documents awaiting a given destinator, newest hand-off first.
    pub async fn list_for_destinator<'e>(
        executor: impl PgExecutor<'e>,
        destinator_name: &str,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE destinator_name = $1
             ORDER BY transfer_timestamp DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(destinator_name)
            .fetch_all(executor)
            .await
    }

    /// List all documents of a template, newest first.
    pub async fn list_for_template<'e>(
        executor: impl PgExecutor<'e>,
        template_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE template_id = $1
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(template_id)
            .fetch_all(executor)
            .await
    }
}
