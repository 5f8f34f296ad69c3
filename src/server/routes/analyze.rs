//! Batch image analysis endpoint
//!
//! `POST /analyze` accepts up to the configured number of images as
//! repeated `image` fields of a `multipart/form-data` body, runs every
//! image through the vision collaborator concurrently and answers with the
//! batch envelope. Individual analysis failures are reported inside their
//! result slot; only batch-level problems produce an error status.

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use futures_util::StreamExt;
use std::time::Duration;
use tracing::info;

use crate::core::batch::BatchOrchestrator;
use crate::core::ingest::{
    IngestError, MultipartIngester, UploadBody, boundary_from_content_type,
};
use crate::core::summary::summarize;
use crate::core::types::BatchEnvelope;
use crate::error::GatewayError;
use crate::server::state::AppState;

/// Batch analysis endpoint.
pub async fn analyze(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> ActixResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    // non-multipart bodies bypass ingestion entirely
    let Some(boundary) = boundary_from_content_type(content_type) else {
        if content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("multipart/form-data")
        {
            return Err(GatewayError::from(IngestError::Malformed(
                "missing multipart boundary".to_string(),
            ))
            .into());
        }
        return Err(GatewayError::NoFilesProvided.into());
    };

    let ingester = MultipartIngester::new(boundary, state.config.upload.limits());
    let body = UploadBody::Streamed(
        payload
            .map(|chunk| chunk.map_err(|e| IngestError::Transport(e.to_string())))
            .boxed_local(),
    );
    let files = ingester.ingest(body).await.map_err(GatewayError::from)?;

    let orchestrator = BatchOrchestrator::new(Duration::from_secs(
        state.config.vision.timeout_secs,
    ));
    let results = orchestrator
        .run(&files, state.analyzer.as_ref())
        .await?;

    let summary = summarize(&results);
    let envelope = BatchEnvelope::assemble(results, summary);
    info!(
        batch_id = %envelope.meta.batch_id,
        total_images = envelope.meta.total_images,
        "batch analyzed"
    );

    Ok(HttpResponse::Ok().json(envelope))
}
