//! Server startup

use crate::core::Gateway;
use crate::core::capabilities::Capability;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Run the server for an initialised gateway
pub async fn run_server(gateway: Gateway) -> Result<()> {
    info!("Starting {} v{}", crate::NAME, crate::VERSION);

    let server = HttpServer::new(gateway);
    let config = server.config();
    info!("Server starting at: http://{}", config.address());
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   GET  /v1/models - Model list");
    for capability in Capability::ALL {
        info!("   POST {} - {}", capability.path(), capability.description());
    }
    info!(
        "   ANY  /v1/* - Forwarded to {}",
        server.state().gateway.upstream().target().base_url
    );

    server.start().await
}
