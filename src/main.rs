//! visionbatch - batch image analysis gateway
//!
//! Receipt OCR and vehicle recognition over one HTTP endpoint.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use visionbatch::server;

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; real deployments inject the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match server::run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
