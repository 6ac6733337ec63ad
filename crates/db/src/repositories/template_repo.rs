//! Repository for the `workflow_templates` table and its stage join.

use sqlx::PgExecutor;
use parapheur_core::types::DbId;

use crate::models::stage::Stage;
use crate::models::template::{CreateTemplate, WorkflowTemplate};

const COLUMNS: &str = "id, label, description, created_at, updated_at";

const STAGE_COLUMNS: &str =
    "s.id, s.label, s.description, s.sequence_number, s.required_role_id, s.created_at, s.updated_at";

/// Provides operations for workflow templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTemplate,
    ) -> Result<WorkflowTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_templates (label, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(&input.label)
            .bind(&input.description)
            .fetch_one(executor)
            .await
    }

    /// Find a template by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<WorkflowTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_templates WHERE id = $1");
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all templates ordered by ID ascending.
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<WorkflowTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_templates ORDER BY id ASC");
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .fetch_all(executor)
            .await
    }

    /// Attach a stage to a template (idempotent).
    pub async fn attach_stage<'e>(
        executor: impl PgExecutor<'e>,
        template_id: DbId,
        stage_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO template_stages (template_id, stage_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(template_id)
        .bind(stage_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// The template's stages ordered by sequence number.
    ///
    /// Duplicate ordinals are not resolved here; `StagePath::new` rejects
    /// them as a data-integrity error.
    pub async fn stages_for<'e>(
        executor: impl PgExecutor<'e>,
        template_id: DbId,
    ) -> Result<Vec<Stage>, sqlx::Error> {
        let query = format!(
            "SELECT {STAGE_COLUMNS} FROM stages s
             JOIN template_stages ts ON ts.stage_id = s.id
             WHERE ts.template_id = $1
             ORDER BY s.sequence_number ASC"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(template_id)
            .fetch_all(executor)
            .await
    }
}
