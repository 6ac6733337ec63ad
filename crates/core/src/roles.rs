//! Role names and the authorization classification built on them.
//!
//! Roles are matched by name. The two elevated system roles are closed
//! variants so authorization checks stay exhaustive instead of comparing
//! strings at every call site. Everything else is a workflow role that a
//! stage may be bound to.
//!
//! The well-known names must match the seed data in
//! `db/migrations/20260301000001_create_roles.sql`.

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";

/// A role name, classified into the closed set of elevated system roles
/// plus arbitrary workflow roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    Admin,
    SuperAdmin,
    Workflow(String),
}

impl RoleName {
    /// Classify a raw role name string.
    pub fn parse(name: &str) -> Self {
        match name {
            ROLE_ADMIN => RoleName::Admin,
            ROLE_SUPERADMIN => RoleName::SuperAdmin,
            other => RoleName::Workflow(other.to_string()),
        }
    }

    /// The raw name as stored in the `roles` table.
    pub fn as_str(&self) -> &str {
        match self {
            RoleName::Admin => ROLE_ADMIN,
            RoleName::SuperAdmin => ROLE_SUPERADMIN,
            RoleName::Workflow(name) => name,
        }
    }

    /// Elevated roles may act on any document regardless of stage binding.
    pub fn is_elevated(&self) -> bool {
        matches!(self, RoleName::Admin | RoleName::SuperAdmin)
    }
}

/// Check whether a set of held roles authorizes acting on a stage bound to
/// `required`. A stage with no bound role (`None`) admits only elevated
/// roles.
pub fn can_act(held: &[RoleName], required: Option<&str>) -> bool {
    if held.iter().any(RoleName::is_elevated) {
        return true;
    }
    match required {
        Some(name) => held
            .iter()
            .any(|r| matches!(r, RoleName::Workflow(n) if n == name)),
        None => false,
    }
}
