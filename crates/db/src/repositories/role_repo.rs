//! Repository for the `roles` table and role-holder lookups.

use sqlx::PgExecutor;
use parapheur_core::types::DbId;

use crate::models::role::{CreateRole, Role};
use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_system_role, permissions, created_at, updated_at";

const USER_COLUMNS: &str =
    "u.id, u.name, u.email, u.password_hash, u.is_active, u.last_login_at, u.created_at, u.updated_at";

/// Provides operations for roles and their holders.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new workflow role, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateRole,
    ) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, description, permissions)
             VALUES ($1, $2, COALESCE($3, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.permissions)
            .fetch_one(executor)
            .await
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name<'e>(
        executor: impl PgExecutor<'e>,
        name: &str,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(executor).await
    }

    /// All active users holding the given role, ordered by user id
    /// ascending so holder resolution is reproducible.
    pub async fn holders_of<'e>(
        executor: impl PgExecutor<'e>,
        role_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u
             JOIN user_roles ur ON ur.user_id = u.id
             WHERE ur.role_id = $1 AND u.is_active = TRUE
             ORDER BY u.id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role_id)
            .fetch_all(executor)
            .await
    }
}
