//! Error types for the gateway
//!
//! One crate-level enum collects the batch-level failures that reach the
//! HTTP boundary; per-item collaborator failures never get here, they are
//! absorbed into `error` outcomes by the orchestrator. The `ResponseError`
//! impl is the classification table: validation failures map to 400, an
//! unusable collaborator payload to 502, everything else to 500.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::core::ingest::IngestError;

/// Result type alias for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Batch-level error type for the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request carried no usable image files
    #[error("no files provided")]
    NoFilesProvided,

    /// Upload validation failed during ingestion
    #[error("invalid image upload: {0}")]
    Ingest(#[from] IngestError),

    /// The collaborator's payload was present but not structured data
    #[error("model returned invalid JSON: {0}")]
    UpstreamFormat(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("internal server error: {0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short, user-facing failure description
    pub error: String,
    /// Additional detail when there is any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GatewayError {
    /// User-facing error string and optional detail for this failure.
    fn body(&self) -> ErrorBody {
        match self {
            Self::NoFilesProvided => ErrorBody {
                error: "No images provided. Send one or more files with field name \"image\"."
                    .to_string(),
                details: None,
            },
            Self::Ingest(err) => ErrorBody {
                error: "Invalid image upload".to_string(),
                details: Some(err.to_string()),
            },
            Self::UpstreamFormat(details) => ErrorBody {
                error: "Model returned invalid JSON".to_string(),
                details: Some(details.clone()),
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                details: Some(self.to_string()),
            },
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFilesProvided | Self::Ingest(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFormat(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
