pub mod admin;
pub mod auth;
pub mod documents;
pub mod health;
pub mod notification;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                      WebSocket (live notification push)
///
/// /auth/login                              login (public)
///
/// /documents                               create (POST)
/// /documents/mine                          documents awaiting the caller (GET)
/// /documents/template/{id}                 documents of a template (GET)
/// /documents/{id}                          get (GET)
/// /documents/{id}/forward                  forward to next stage (POST)
/// /documents/{id}/reject                   send back one stage (POST)
/// /documents/{id}/view                     destinator opens document (POST)
/// /documents/{id}/audit                    audit trail, chronological (GET)
///
/// /notifications                           list (?unread_only, limit, offset)
/// /notifications/read-all                  mark all read (POST)
/// /notifications/unread-count              unread count (GET)
/// /notifications/{id}/read                 mark read (POST)
/// /notifications/{id}                      delete (DELETE)
///
/// /admin/roles                             list, create (elevated only)
/// /admin/roles/{id}/holders                active holders in resolution order
/// /admin/stages                            list, create
/// /admin/stages/{id}                       delete (refused while occupied)
/// /admin/templates                         list, create
/// /admin/templates/{id}/stages             ordered stage path (GET)
/// /admin/templates/{id}/stages/{stage_id}  attach stage (PUT)
/// /admin/users                             list, create
/// /admin/users/{id}/roles/{role_id}        assign role (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Authentication.
        .nest("/auth", auth::router())
        // Documents and their transitions.
        .nest("/documents", documents::router())
        // Notification inbox.
        .nest("/notifications", notification::router())
        // Administration (roles, stages, templates, users).
        .nest("/admin", admin::router())
}
