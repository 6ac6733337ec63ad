//! Route definitions for the `/documents` resource.
//!
//! All endpoints require authentication; the transition endpoints perform
//! stage-level authorization inside the engine.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// POST   /                -> create_document
/// GET    /mine            -> list_my_documents
/// GET    /template/{id}   -> list_template_documents
/// GET    /{id}            -> get_document
/// POST   /{id}/forward    -> forward_document
/// POST   /{id}/reject     -> reject_document
/// POST   /{id}/view       -> view_document
/// GET    /{id}/audit      -> list_audit_trail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(document::create_document))
        .route("/mine", get(document::list_my_documents))
        .route("/template/{id}", get(document::list_template_documents))
        .route("/{id}", get(document::get_document))
        .route("/{id}/forward", post(document::forward_document))
        .route("/{id}/reject", post(document::reject_document))
        .route("/{id}/view", post(document::view_document))
        .route("/{id}/audit", get(document::list_audit_trail))
}
