//! Role entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Built-in roles (`admin`, `superadmin`) are flagged so they cannot be
    /// confused with workflow roles.
    pub is_system_role: bool,
    pub permissions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a workflow role.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<serde_json::Value>,
}
