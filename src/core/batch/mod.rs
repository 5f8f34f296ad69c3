//! Batch analysis orchestration
//!
//! Fans out one collaborator call per uploaded file, all launched
//! concurrently, and collects the settled outcomes back into input order.
//! Each call is independently guarded: a failure (or timeout) becomes that
//! slot's `Error` outcome and never sinks the rest of the batch.

use futures::future::join_all;
use std::time::Duration;
use tracing::warn;

use crate::core::types::{AnalysisOutcome, UploadedFile};
use crate::core::vision::{VisionAnalyzer, VisionError};
use crate::error::{GatewayError, Result};

/// Fan-out coordinator for one batch of files.
pub struct BatchOrchestrator {
    per_call_timeout: Duration,
}

impl BatchOrchestrator {
    /// Create an orchestrator applying `per_call_timeout` to every
    /// collaborator call.
    pub fn new(per_call_timeout: Duration) -> Self {
        Self { per_call_timeout }
    }

    /// Analyze every file concurrently and return outcomes ordered by input
    /// position.
    ///
    /// Rejects an empty batch before fan-out; that is the only way this
    /// method fails. `join_all` resolves each future into its own slot, so
    /// a slow early image never trades places with a fast late one.
    pub async fn run(
        &self,
        files: &[UploadedFile],
        analyzer: &dyn VisionAnalyzer,
    ) -> Result<Vec<AnalysisOutcome>> {
        if files.is_empty() {
            return Err(GatewayError::NoFilesProvided);
        }

        let outcomes = join_all(files.iter().enumerate().map(|(index, file)| {
            let image_id = format!("img_{}", index + 1);
            async move {
                let call = analyzer.analyze(&file.content, &file.media_type);
                match tokio::time::timeout(self.per_call_timeout, call).await {
                    Ok(Ok(raw)) => AnalysisOutcome::from_raw(image_id, raw),
                    Ok(Err(err)) => {
                        warn!(%image_id, error = %err, "image analysis failed");
                        AnalysisOutcome::failed(image_id, err.to_string())
                    }
                    Err(_) => {
                        let err = VisionError::Timeout(self.per_call_timeout.as_secs());
                        warn!(%image_id, error = %err, "image analysis timed out");
                        AnalysisOutcome::failed(image_id, err.to_string())
                    }
                }
            }
        }))
        .await;

        Ok(outcomes)
    }
}
