//! Wire-level data model for batch analysis
//!
//! Everything the gateway puts on the wire lives here: the per-image
//! outcome, the batch envelope with its metadata, and the derived summary.

pub mod payload;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

pub use payload::{TicketPayload, VehiclePayload};

/// A single validated file extracted from a multipart upload.
///
/// Created by the ingester as each part's body completes and consumed by
/// exactly one analysis call. Content is an opaque byte buffer; the gateway
/// never decodes pixels.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Multipart field name the file arrived under
    pub field_name: String,
    /// Client-declared filename (falls back to the field name)
    pub original_name: String,
    /// Declared media type, e.g. `image/jpeg`
    pub media_type: String,
    /// Raw file bytes
    pub content: bytes::Bytes,
}

/// Classification assigned to an analyzed image.
///
/// Unrecognized strings from the model deserialize as `Unknown` rather than
/// failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Receipt / purchase ticket
    Ticket,
    /// Vehicle / license plate
    Vehicle,
    /// Analysis failed for this image
    Error,
    /// Image matched no supported type
    #[serde(other)]
    Unknown,
}

/// Structured result returned by the vision collaborator.
///
/// All fields are optional; the orchestrator substitutes defaults for
/// anything the model leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    /// Detected image classification
    #[serde(rename = "type")]
    pub kind: Option<AnalysisKind>,
    /// Model confidence in [0, 1]
    pub confidence: Option<f32>,
    /// Type-specific payload (ticket or vehicle shape)
    pub data: Option<Value>,
}

/// Per-image analysis outcome, always present even on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Position-derived identifier, `img_1`-based
    pub image_id: String,
    /// Outcome classification
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    /// Model confidence, forced to 0 on failure
    pub confidence: f32,
    /// Payload as returned by the collaborator, verbatim
    pub data: Value,
}

impl AnalysisOutcome {
    /// Build an outcome from a fulfilled collaborator call.
    pub fn from_raw(image_id: String, raw: RawAnalysis) -> Self {
        Self {
            image_id,
            kind: raw.kind.unwrap_or(AnalysisKind::Unknown),
            confidence: raw.confidence.unwrap_or(0.0),
            data: raw.data.unwrap_or_else(|| serde_json::json!({})),
        }
    }

    /// Build the outcome for a failed collaborator call.
    ///
    /// The failure message lands in the payload's `warnings` list so callers
    /// see why this slot carries no data.
    pub fn failed(image_id: String, message: impl Into<String>) -> Self {
        Self {
            image_id,
            kind: AnalysisKind::Error,
            confidence: 0.0,
            data: serde_json::json!({ "warnings": [message.into()] }),
        }
    }
}

/// Aggregate monetary figure, valid only across currency-homogeneous tickets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTotal {
    /// Sum of ticket totals, rounded to cents
    pub amount: f64,
    /// The single currency shared by every ticket
    pub currency: String,
}

/// Derived statistics over a batch of outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of outcomes classified as tickets
    pub total_tickets: usize,
    /// Number of outcomes classified as vehicles
    pub vehicles_detected: usize,
    /// Vehicle type histogram; missing types count as `unknown`
    pub vehicle_types: BTreeMap<String, u64>,
    /// Combined ticket total; absent unless every ticket (of two or more)
    /// shares one non-null currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_total: Option<CombinedTotal>,
}

/// Request-scoped batch metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMeta {
    /// Unique id for this batch, `batch_` + short uuid
    pub batch_id: String,
    /// UTC timestamp the batch was processed
    pub processed_at: DateTime<Utc>,
    /// Number of images in the batch
    pub total_images: usize,
}

impl BatchMeta {
    /// Stamp fresh metadata for a batch of `total_images` images.
    pub fn stamp(total_images: usize) -> Self {
        Self {
            batch_id: format!("batch_{}", &Uuid::new_v4().to_string()[..8]),
            processed_at: Utc::now(),
            total_images,
        }
    }
}

/// The complete success response for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEnvelope {
    /// Batch metadata
    pub meta: BatchMeta,
    /// Per-image outcomes, ordered by input position
    pub results: Vec<AnalysisOutcome>,
    /// Derived summary statistics
    pub summary: BatchSummary,
}

impl BatchEnvelope {
    /// Assemble the envelope; `total_images` is derived from the results.
    pub fn assemble(results: Vec<AnalysisOutcome>, summary: BatchSummary) -> Self {
        Self {
            meta: BatchMeta::stamp(results.len()),
            results,
            summary,
        }
    }
}
