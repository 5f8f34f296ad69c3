//! HTTP server core implementation

use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, web};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::{Config, ServerConfig};
use crate::core::vision::OpenAiVision;
use crate::error::{GatewayError, Result};
use crate::server::routes;
use crate::server::state::AppState;

/// HTTP server.
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, wiring the OpenAI adapter into the state.
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let analyzer = OpenAiVision::new(config.vision.clone())
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let state = AppState::new(config.clone(), Arc::new(analyzer));

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    /// Start the HTTP server.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let workers = self.config.workers;

        let mut server = ActixHttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Cors::permissive())
                .wrap(TracingLogger::default())
                .configure(routes::configure)
        })
        .bind(&bind_addr)
        .map_err(|e| {
            GatewayError::Config(format!("Failed to bind {bind_addr}: {e}"))
        })?;

        if let Some(workers) = workers {
            server = server.workers(workers);
        }

        info!("HTTP server listening on {}", bind_addr);
        server
            .run()
            .await
            .map_err(|e| GatewayError::Internal(format!("Server error: {e}")))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
