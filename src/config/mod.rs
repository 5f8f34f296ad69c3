//! Configuration management for the gateway
//!
//! Configuration loads from an optional YAML file and is then overlaid with
//! environment variables, so deployments can keep secrets out of files.
//! Everything that used to be read ambiently at call time (API key, prompt
//! override) lands here once, at startup.

pub mod models;

pub use models::{ServerConfig, UploadConfig, VisionConfig};

use std::path::Path;
use tracing::{debug, info};

use crate::error::{GatewayError, Result};

/// Environment variable holding the OpenAI API key.
const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the analysis prompt.
const ENV_PROMPT: &str = "VISION_PROMPT";
/// Environment variable overriding the server port.
const ENV_PORT: &str = "PORT";

/// Main configuration struct for the gateway.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Upload ingestion limits
    pub upload: UploadConfig,
    /// Vision collaborator settings
    pub vision: VisionConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from `path` when it exists, falling back to
    /// defaults, then overlay environment variables.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path).await?
        } else {
            debug!("No configuration file found, using defaults");
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                self.vision.api_key = key;
            }
        }
        if let Ok(prompt) = std::env::var(ENV_PROMPT) {
            if !prompt.is_empty() {
                self.vision.prompt = Some(prompt);
            }
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.server
            .validate()
            .map_err(|e| GatewayError::Config(format!("Server config error: {e}")))?;
        self.upload
            .validate()
            .map_err(|e| GatewayError::Config(format!("Upload config error: {e}")))?;
        self.vision
            .validate()
            .map_err(|e| GatewayError::Config(format!("Vision config error: {e}")))?;
        Ok(())
    }
}
