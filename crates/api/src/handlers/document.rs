//! Handlers for the `/documents` resource.
//!
//! The transition endpoints (`forward`, `reject`, `view`) delegate to the
//! [`WorkflowEngine`](crate::engine::WorkflowEngine); stage authorization
//! happens there, inside the transition transaction.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use parapheur_core::error::CoreError;
use parapheur_core::types::DbId;
use parapheur_db::models::audit_entry::AuditEntry;
use parapheur_db::models::document::{CreateDocument, Document};
use parapheur_db::repositories::{AuditEntryRepo, DocumentRepo};

use crate::engine::Actor;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for forward: optional annotations for the audit trail.
#[derive(Debug, Default, Deserialize)]
pub struct ForwardRequest {
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Request body for reject: the reason(s) are mandatory.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1, message = "a rejection requires at least one comment"))]
    pub comments: Vec<String>,
}

/// POST /api/v1/documents
///
/// Create a document at the entry stage of a workflow template.
pub async fn create_document(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDocument>,
) -> AppResult<Json<DataResponse<Document>>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let document = state
        .engine
        .create_in_workflow(input.template_id, &input.title)
        .await?;
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id: document_id,
        }))?;
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/documents/mine
///
/// Documents currently awaiting the authenticated user.
pub async fn list_my_documents(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    let documents = DocumentRepo::list_for_destinator(&state.pool, &auth.name).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/documents/template/{template_id}
///
/// All documents created in a workflow template, newest first.
pub async fn list_template_documents(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    let documents = DocumentRepo::list_for_template(&state.pool, template_id).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/documents/{id}/forward
pub async fn forward_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Json(input): Json<ForwardRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let actor = Actor::from(auth);
    let outcome = state
        .engine
        .forward(document_id, &actor, &input.comments)
        .await?;
    Ok(Json(serde_json::json!({
        "data": {
            "document": outcome.document,
            "destinator": outcome.destinator.map(|u| u.name),
        }
    })))
}

/// POST /api/v1/documents/{id}/reject
pub async fn reject_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validator::Validate::validate(&input).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let actor = Actor::from(auth);
    let outcome = state
        .engine
        .reject(document_id, &actor, &input.comments)
        .await?;
    Ok(Json(serde_json::json!({
        "data": {
            "document": outcome.document,
            "destinator": outcome.destinator.map(|u| u.name),
        }
    })))
}

/// POST /api/v1/documents/{id}/view
///
/// Open the document: the destinator's view advances the hand-off delivery
/// state, and any authorized view recomputes the review status.
pub async fn view_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let actor = Actor::from(auth);
    let document = state.engine.view(document_id, &actor).await?;
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/documents/{id}/audit
///
/// The document's audit trail in chronological order.
pub async fn list_audit_trail(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditEntry>>>> {
    DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id: document_id,
        }))?;

    let entries = AuditEntryRepo::list_for_document(&state.pool, document_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
