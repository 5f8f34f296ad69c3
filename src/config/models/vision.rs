//! Vision collaborator configuration

use serde::{Deserialize, Serialize};

/// Settings for the OpenAI Vision adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// API key; usually injected through `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: String,
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Completion token limit per image
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Image detail level passed to the model
    #[serde(default = "default_detail")]
    pub detail: String,
    /// Analysis prompt override; the built-in unified prompt applies when
    /// unset
    #[serde(default)]
    pub prompt: Option<String>,
    /// Per-call deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            detail: default_detail(),
            prompt: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl VisionConfig {
    /// Validate vision configuration. The API key is checked at adapter
    /// construction instead, so config files without secrets still load.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base.is_empty() {
            return Err("api_base cannot be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs cannot be 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens cannot be 0".to_string());
        }
        Ok(())
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_detail() -> String {
    "high".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}
