use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::WorkflowEngine;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: parapheur_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (live notification push).
    pub ws_manager: Arc<WsManager>,
    /// Bus carrying committed workflow transitions.
    pub event_bus: Arc<parapheur_events::EventBus>,
    /// The transition engine.
    pub engine: WorkflowEngine,
}
