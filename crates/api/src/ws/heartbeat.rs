//! Periodic WebSocket heartbeat.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::manager::WsManager;

/// Interval between heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat task: pings every connection on a fixed interval so
/// intermediaries keep idle connections open and dead peers surface.
pub fn start_heartbeat(manager: Arc<WsManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            ticker.tick().await;
            manager.ping_all().await;
        }
    })
}
