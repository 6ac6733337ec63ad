//! Administration handlers: roles, stages, workflow templates and users.
//!
//! Every route here requires an elevated role (`admin` or `superadmin`),
//! enforced by the [`RequireElevated`] extractor.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use parapheur_core::error::CoreError;
use parapheur_core::types::DbId;
use parapheur_db::models::role::{CreateRole, Role};
use parapheur_db::models::stage::{CreateStage, Stage};
use parapheur_db::models::template::{CreateTemplate, WorkflowTemplate};
use parapheur_db::models::user::User;
use parapheur_db::repositories::{RoleRepo, StageRepo, TemplateRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireElevated;
use crate::response::DataResponse;
use crate::state::AppState;

// Roles

/// POST /api/v1/admin/roles
pub async fn create_role(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Json(input): Json<CreateRole>,
) -> AppResult<Json<DataResponse<Role>>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let role = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(role_id = role.id, name = %role.name, "Role created");
    Ok(Json(DataResponse { data: role }))
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    _guard: RequireElevated,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// GET /api/v1/admin/roles/{id}/holders
///
/// Active users holding the role, in resolution order.
pub async fn list_role_holders(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Path(role_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;

    let holders = RoleRepo::holders_of(&state.pool, role_id).await?;
    Ok(Json(DataResponse { data: holders }))
}

// Stages

/// POST /api/v1/admin/stages
pub async fn create_stage(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Json(input): Json<CreateStage>,
) -> AppResult<Json<DataResponse<Stage>>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(role_id) = input.required_role_id {
        RoleRepo::find_by_id(&state.pool, role_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Role",
                id: role_id,
            }))?;
    }

    let stage = StageRepo::create(&state.pool, &input).await?;
    tracing::info!(stage_id = stage.id, label = %stage.label, "Stage created");
    Ok(Json(DataResponse { data: stage }))
}

/// GET /api/v1/admin/stages
pub async fn list_stages(
    _guard: RequireElevated,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Stage>>>> {
    let stages = StageRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: stages }))
}

/// DELETE /api/v1/admin/stages/{id}
///
/// Refused while any document sits at the stage.
pub async fn delete_stage(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if StageRepo::is_occupied(&state.pool, stage_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Stage is occupied by at least one document".into(),
        )));
    }

    let deleted = StageRepo::delete(&state.pool, stage_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id: stage_id,
        }));
    }
    tracing::info!(stage_id, "Stage deleted");
    Ok(Json(serde_json::json!({ "data": { "deleted": true } })))
}

// Workflow templates

/// POST /api/v1/admin/templates
pub async fn create_template(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<Json<DataResponse<WorkflowTemplate>>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let template = TemplateRepo::create(&state.pool, &input).await?;
    tracing::info!(template_id = template.id, label = %template.label, "Template created");
    Ok(Json(DataResponse { data: template }))
}

/// GET /api/v1/admin/templates
pub async fn list_templates(
    _guard: RequireElevated,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WorkflowTemplate>>>> {
    let templates = TemplateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// PUT /api/v1/admin/templates/{id}/stages/{stage_id}
pub async fn attach_stage(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Path((template_id, stage_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowTemplate",
            id: template_id,
        }))?;
    StageRepo::find_by_id(&state.pool, stage_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id: stage_id,
        }))?;

    TemplateRepo::attach_stage(&state.pool, template_id, stage_id).await?;
    Ok(Json(serde_json::json!({ "data": { "attached": true } })))
}

/// GET /api/v1/admin/templates/{id}/stages
pub async fn list_template_stages(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Stage>>>> {
    TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowTemplate",
            id: template_id,
        }))?;

    let stages = TemplateRepo::stages_for(&state.pool, template_id).await?;
    Ok(Json(DataResponse { data: stages }))
}

// Users

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<DbId>,
}

/// POST /api/v1/admin/users
pub async fn create_user(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<Json<DataResponse<User>>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &input.name,
        input.email.as_deref(),
        &password_hash,
    )
    .await?;

    for role_id in &input.role_ids {
        RoleRepo::find_by_id(&state.pool, *role_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Role",
                id: *role_id,
            }))?;
        UserRepo::assign_role(&state.pool, user.id, *role_id).await?;
    }

    tracing::info!(user_id = user.id, name = %user.name, "User created");
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    _guard: RequireElevated,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// PUT /api/v1/admin/users/{id}/roles/{role_id}
pub async fn assign_role(
    _guard: RequireElevated,
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;

    UserRepo::assign_role(&state.pool, user_id, role_id).await?;
    Ok(Json(serde_json::json!({ "data": { "assigned": true } })))
}
