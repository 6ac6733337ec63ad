//! User entity model.

use serde::Serialize;
use sqlx::FromRow;
use parapheur_core::types::{DbId, Timestamp};

/// A user row from the `users` table. The password hash never leaves the
/// persistence layer serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
