//! Vision collaborator interface
//!
//! The gateway only depends on the collaborator's input/output contract:
//! image bytes plus a declared media type go in, a tagged [`RawAnalysis`]
//! comes out. The trait is the dependency-injection seam; production wires
//! in [`OpenAiVision`], tests substitute a scripted fake.

mod error;
mod openai;
mod prompt;

pub use error::VisionError;
pub use openai::OpenAiVision;
pub use prompt::DEFAULT_PROMPT;

use async_trait::async_trait;

use crate::core::types::RawAnalysis;

/// An image-understanding collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Classify one image and extract its structured payload.
    async fn analyze(&self, image: &[u8], media_type: &str) -> Result<RawAnalysis, VisionError>;
}
