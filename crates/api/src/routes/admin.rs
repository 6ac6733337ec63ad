//! Route definitions for the `/admin` resource.
//!
//! Every handler takes the `RequireElevated` extractor, so the elevation
//! check happens per-request even if a route is mounted elsewhere.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /roles                             -> list_roles
/// POST   /roles                             -> create_role
/// GET    /roles/{id}/holders                -> list_role_holders
///
/// GET    /stages                            -> list_stages
/// POST   /stages                            -> create_stage
/// DELETE /stages/{id}                       -> delete_stage
///
/// GET    /templates                         -> list_templates
/// POST   /templates                         -> create_template
/// GET    /templates/{id}/stages             -> list_template_stages
/// PUT    /templates/{id}/stages/{stage_id}  -> attach_stage
///
/// GET    /users                             -> list_users
/// POST   /users                             -> create_user
/// PUT    /users/{id}/roles/{role_id}        -> assign_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(admin::list_roles).post(admin::create_role))
        .route("/roles/{id}/holders", get(admin::list_role_holders))
        .route("/stages", get(admin::list_stages).post(admin::create_stage))
        .route("/stages/{id}", delete(admin::delete_stage))
        .route(
            "/templates",
            get(admin::list_templates).post(admin::create_template),
        )
        .route("/templates/{id}/stages", get(admin::list_template_stages))
        .route(
            "/templates/{id}/stages/{stage_id}",
            put(admin::attach_stage),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}/roles/{role_id}", put(admin::assign_role))
}
