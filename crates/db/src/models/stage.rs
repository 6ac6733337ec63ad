//! Stage (étape) entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use parapheur_core::stage::StageRef;
use parapheur_core::types::{DbId, Timestamp};

/// A stage row from the `stages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stage {
    pub id: DbId,
    pub label: String,
    pub description: Option<String>,
    pub sequence_number: i32,
    /// `None` means no role is bound; only elevated roles may act.
    pub required_role_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Stage {
    /// Project the row into the core stage-directory reference.
    pub fn to_ref(&self) -> StageRef {
        StageRef {
            id: self.id,
            label: self.label.clone(),
            sequence_number: self.sequence_number,
            required_role_id: self.required_role_id,
        }
    }
}

/// DTO for creating a stage.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateStage {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
    pub description: Option<String>,
    pub sequence_number: i32,
    pub required_role_id: Option<DbId>,
}
