//! Document entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// A row from the `documents` table.
///
/// `status` and `transfer_status` are stored as their canonical strings;
/// the engine parses them into `parapheur_core::status` enums before acting.
/// `version` is the optimistic-lock counter checked by every transition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub title: String,
    pub template_id: DbId,
    pub current_stage_id: Option<DbId>,
    pub status: String,
    pub transfer_status: String,
    /// Name of the user expected to act next (denormalized on purpose).
    pub destinator_name: Option<String>,
    pub transfer_timestamp: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a document in a workflow.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateDocument {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub template_id: DbId,
}

/// The state a transition writes onto a document, applied atomically
/// together with its audit entries and notification. The hand-off
/// timestamp is stamped by the database clock, the same clock that stamps
/// audit entries.
#[derive(Debug, Clone)]
pub struct TransitionUpdate {
    pub current_stage_id: Option<DbId>,
    pub status: String,
    pub transfer_status: String,
    pub destinator_name: Option<String>,
}
