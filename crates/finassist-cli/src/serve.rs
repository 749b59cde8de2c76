//! `finassist serve`: run the HTTP/WebSocket server.

use finassist_core::Config;
use finassist_gateway::{Gateway, GatewayConfig};
use finassist_providers::OpenAIAssistants;
use std::sync::Arc;

/// Build the backend and run the gateway until it exits.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let backend = Arc::new(OpenAIAssistants::from_config(&config)?);
    let gateway = Gateway::new(GatewayConfig::from_config(&config), backend);

    gateway.run().await?;
    Ok(())
}
