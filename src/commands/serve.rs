//! WebSocket server command

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::transport::{ws, ConnectionManager};

/// Run the persistent WebSocket server until interrupted.
pub async fn run_serve(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.ws_bind.clone());
    let router = super::build_router(&config)?;
    let connections = Arc::new(ConnectionManager::new());

    ws::serve(&bind, router, connections).await
}
