//! # visionbatch
//!
//! A batch image analysis gateway: upload up to 20 images in one
//! `multipart/form-data` request and get back structured JSON for each one.
//! The gateway auto-detects whether an image is a **receipt/ticket** or a
//! **vehicle/license plate** through an OpenAI Vision call, isolates
//! per-image failures, and derives a batch summary with an optional
//! currency-safe combined total.
//!
//! ## Pipeline
//!
//! ```text
//! multipart body -> ingest -> ordered files -> fan-out analysis
//!                -> ordered outcomes -> summary -> batch envelope
//! ```
//!
//! ## Running the gateway
//!
//! ```rust,no_run
//! use visionbatch::server;
//!
//! #[tokio::main]
//! async fn main() -> visionbatch::Result<()> {
//!     // Reads config/gateway.yaml when present, then the environment
//!     // (OPENAI_API_KEY, VISION_PROMPT, PORT).
//!     server::run_server().await
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
mod error;
pub mod server;

// Re-export main types
pub use config::Config;
pub use error::{ErrorBody, GatewayError, Result};

pub use core::batch::BatchOrchestrator;
pub use core::ingest::{
    IngestError, MultipartIngester, UploadBody, UploadLimits, boundary_from_content_type,
};
pub use core::summary::summarize;
pub use core::types::{
    AnalysisKind, AnalysisOutcome, BatchEnvelope, BatchMeta, BatchSummary, CombinedTotal,
    RawAnalysis, UploadedFile,
};
pub use core::vision::{OpenAiVision, VisionAnalyzer, VisionError};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
