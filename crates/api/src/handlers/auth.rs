//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use parapheur_core::error::CoreError;
use parapheur_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access token carrying the user's role
/// names. Invalid name and invalid password are indistinguishable to the
/// caller.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_name(&state.pool, &input.name)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid)?;

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("password verification failed: {e}")))?;
    if !matches {
        return Err(invalid());
    }

    let roles = UserRepo::role_names_for(&state.pool, user.id).await?;
    let token = generate_access_token(user.id, &user.name, &roles, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("token generation failed: {e}")))?;

    UserRepo::touch_last_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(serde_json::json!({
        "data": {
            "token": token,
            "user": { "id": user.id, "name": user.name, "roles": roles },
        }
    })))
}
