//! Role-based access control (RBAC) extractor.
//!
//! Wraps [`AuthUser`] and rejects requests whose roles do not meet the
//! minimum requirement, enforcing authorization at the type level.
//! Per-document stage authorization is finer-grained and lives in the
//! transition engine.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parapheur_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `admin` or `superadmin`. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireElevated(user): RequireElevated) -> AppResult<Json<()>> {
///     // user is guaranteed to hold an elevated role here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireElevated(pub AuthUser);

impl FromRequestParts<AppState> for RequireElevated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_elevated() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or superadmin role required".into(),
            )));
        }
        Ok(RequireElevated(user))
    }
}
