//! HTTP gateway command

use crate::config::Config;
use crate::error::Result;
use crate::transport::gateway;

/// Run the stateless HTTP gateway until interrupted.
pub async fn run_gateway(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.http_bind.clone());
    let router = super::build_router(&config)?;

    gateway::serve(&bind, router).await
}
