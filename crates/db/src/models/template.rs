//! Workflow template entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// A row from the `workflow_templates` table. The ordered stage path is
/// reached through the `template_stages` join.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTemplate {
    pub id: DbId,
    pub label: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a workflow template.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateTemplate {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
    pub description: Option<String>,
}
