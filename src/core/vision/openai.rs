//! OpenAI Vision adapter
//!
//! Drives the chat completions endpoint with a single user message holding
//! the analysis prompt and the image as a base64 data URL. The JSON response
//! format is requested so the assistant content parses directly into
//! [`RawAnalysis`].

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_PROMPT, VisionAnalyzer, VisionError};
use crate::config::VisionConfig;
use crate::core::types::RawAnalysis;

/// Vision collaborator backed by the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: reqwest::Client,
    config: VisionConfig,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiVision {
    /// Construct the adapter from configuration.
    ///
    /// The prompt override is resolved here, at construction time; nothing
    /// is read from the environment during calls.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        if config.api_key.is_empty() {
            return Err(VisionError::Configuration(
                "api_key is not set (set OPENAI_API_KEY)".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VisionError::Configuration(e.to_string()))?;
        let prompt = config
            .prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        Ok(Self {
            client,
            config,
            prompt,
        })
    }

    fn build_request(&self, image: &[u8], media_type: &str) -> Value {
        let data_url = format!("data:{};base64,{}", media_type, BASE64.encode(image));
        json!({
            "model": self.config.model,
            "response_format": { "type": "json_object" },
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": self.prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": data_url, "detail": self.config.detail }
                    }
                ]
            }],
            "max_tokens": self.config.max_tokens,
        })
    }

    fn parse_content(content: &str) -> Result<RawAnalysis, VisionError> {
        serde_json::from_str(content).map_err(|e| VisionError::ResponseFormat(e.to_string()))
    }
}

#[async_trait]
impl VisionAnalyzer for OpenAiVision {
    async fn analyze(&self, image: &[u8], media_type: &str) -> Result<RawAnalysis, VisionError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        debug!(media_type, bytes = image.len(), "submitting image for analysis");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&self.build_request(image, media_type))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(map_http_error(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        let completion: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| VisionError::ResponseFormat(format!("invalid completion envelope: {e}")))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(VisionError::EmptyResponse)?;

        Self::parse_content(&content)
    }
}

/// Map a non-success API status to an error, pulling the message out of the
/// OpenAI error envelope when one is present.
fn map_http_error(status: u16, body: &str) -> VisionError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    VisionError::Api { status, message }
}
