//! Repository for the `stages` table.

use sqlx::PgExecutor;
use parapheur_core::types::DbId;

use crate::models::stage::{CreateStage, Stage};

const COLUMNS: &str =
    "id, label, description, sequence_number, required_role_id, created_at, updated_at";

/// Provides operations for stages.
pub struct StageRepo;

impl StageRepo {
    /// Insert a new stage, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateStage,
    ) -> Result<Stage, sqlx::Error> {
        let query = format!(
            "INSERT INTO stages (label, description, sequence_number, required_role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(&input.label)
            .bind(&input.description)
            .bind(input.sequence_number)
            .bind(input.required_role_id)
            .fetch_one(executor)
            .await
    }

    /// Find a stage by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stages WHERE id = $1");
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all stages ordered by sequence number then id.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Stage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stages ORDER BY sequence_number ASC, id ASC");
        sqlx::query_as::<_, Stage>(&query).fetch_all(executor).await
    }

    /// Delete a stage. Returns `false` when no row was deleted.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stages WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any document currently occupies this stage. Stage deletion
    /// is disallowed while this is true.
    pub async fn is_occupied<'e>(
        executor: impl PgExecutor<'e>,
        stage_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE current_stage_id = $1)")
            .bind(stage_id)
            .fetch_one(executor)
            .await
    }
}
