//! Vision collaborator error handling
//!
//! Transport-level failures are kept distinct from format-level ones: a
//! model that answers with prose instead of JSON is `ResponseFormat`, not
//! `Network`. Messages are user-visible through per-item warnings, so they
//! name the failure without echoing credentials or request payloads.

use thiserror::Error;

/// Errors from one collaborator call.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The HTTP request to the model could not be completed
    #[error("Vision request failed: {0}")]
    Network(String),

    /// The model API answered with a non-success status
    #[error("Vision API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code from the model API
        status: u16,
        /// Short failure description
        message: String,
    },

    /// The model's reply carried no content to parse
    #[error("Vision model returned an empty response")]
    EmptyResponse,

    /// The model's content was not parseable as a structured analysis
    #[error("Model returned invalid JSON: {0}")]
    ResponseFormat(String),

    /// The call exceeded the configured deadline
    #[error("Vision analysis timed out after {0}s")]
    Timeout(u64),

    /// The adapter was constructed with unusable settings
    #[error("Vision configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest reports its own deadline; the orchestrator's outer
            // timeout carries the configured seconds instead
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}
