//! WebSocket upgrade handler.
//!
//! Clients connect with `GET /api/v1/ws?token=<jwt>`; browsers cannot set
//! an `Authorization` header on the upgrade request, so the access token
//! travels as a query parameter. The connection is registered for the
//! authenticated user and receives live workflow push messages.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;
use parapheur_core::error::CoreError;
use parapheur_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/v1/ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let claims = validate_token(&params.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let user_id = claims.sub;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Drive one connection: register it, pump outbound messages from the
/// registry channel, drain inbound frames, and deregister on any exit.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId) {
    let conn_id = Uuid::new_v4().to_string();
    let mut rx = state.ws_manager.register(conn_id.clone(), user_id).await;
    tracing::debug!(%conn_id, user_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Close(_) => break,
                // Pongs and client text frames are ignored; the push channel
                // is one-way.
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.ws_manager.deregister(&conn_id).await;
    tracing::debug!(%conn_id, user_id, "WebSocket disconnected");
}
