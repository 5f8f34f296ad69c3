//! Server bootstrap
//!
//! `run_server` loads configuration (file, then environment) and starts the
//! gateway.

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::server::server::HttpServer;

/// Default configuration file location.
const CONFIG_PATH: &str = "config/gateway.yaml";

/// Run the server with automatic configuration loading.
pub async fn run_server() -> Result<()> {
    info!("Starting visionbatch gateway");

    let config = Config::load(CONFIG_PATH).await?;
    let server = HttpServer::new(&config)?;

    info!("Server starting at: http://{}", config.server.address());
    info!("API Endpoints:");
    info!("   GET  /health  - Health check");
    info!("   POST /analyze - Batch image analysis");

    server.start().await
}
