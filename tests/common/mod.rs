//! Shared test fixtures
//!
//! A scripted vision analyzer keyed by image bytes, multipart body
//! builders, and payload factories for the two analysis shapes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use visionbatch::core::types::payload::{
    TicketMeta, TicketPayload, TicketTotals, VehicleAttrs, VehiclePayload,
};
use visionbatch::server::AppState;
use visionbatch::{AnalysisKind, Config, RawAnalysis, VisionAnalyzer, VisionError};

/// Boundary used by every generated test body.
pub const BOUNDARY: &str = "----visionbatch-test-boundary";

struct Reply {
    delay: Duration,
    result: Result<RawAnalysis, String>,
}

/// Vision analyzer answering from a script keyed by image content.
///
/// Unscripted images resolve to an empty `RawAnalysis`, which the
/// orchestrator turns into an `unknown` outcome.
#[derive(Default)]
pub struct FakeAnalyzer {
    replies: HashMap<Vec<u8>, Reply>,
}

impl FakeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful analysis for `image`.
    pub fn on(mut self, image: &[u8], raw: RawAnalysis) -> Self {
        self.replies.insert(
            image.to_vec(),
            Reply {
                delay: Duration::ZERO,
                result: Ok(raw),
            },
        );
        self
    }

    /// Script a successful analysis delivered after `delay_ms`.
    pub fn slow(mut self, image: &[u8], delay_ms: u64, raw: RawAnalysis) -> Self {
        self.replies.insert(
            image.to_vec(),
            Reply {
                delay: Duration::from_millis(delay_ms),
                result: Ok(raw),
            },
        );
        self
    }

    /// Script a failing analysis for `image`.
    pub fn failing(mut self, image: &[u8], message: &str) -> Self {
        self.replies.insert(
            image.to_vec(),
            Reply {
                delay: Duration::ZERO,
                result: Err(message.to_string()),
            },
        );
        self
    }
}

#[async_trait]
impl VisionAnalyzer for FakeAnalyzer {
    async fn analyze(&self, image: &[u8], _media_type: &str) -> Result<RawAnalysis, VisionError> {
        match self.replies.get(image) {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply
                    .result
                    .clone()
                    .map_err(|message| VisionError::Api {
                        status: 500,
                        message,
                    })
            }
            None => Ok(RawAnalysis::default()),
        }
    }
}

/// Build application state around a scripted analyzer.
pub fn state_with(analyzer: FakeAnalyzer, config: Config) -> web::Data<AppState> {
    web::Data::new(AppState::new(config, Arc::new(analyzer)))
}

/// Content-Type header value matching [`multipart_body`].
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Build a multipart body of image parts under the repeated `image` field.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (filename, content_type, content) in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        out.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        out.extend_from_slice(content);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

/// Scripted ticket analysis with the given total and currency.
pub fn ticket_raw(total: Option<f64>, currency: Option<&str>) -> RawAnalysis {
    let payload = TicketPayload {
        ticket: TicketMeta {
            currency: currency.map(str::to_string),
            ..Default::default()
        },
        totals: TicketTotals {
            total,
            ..Default::default()
        },
        ..Default::default()
    };
    RawAnalysis {
        kind: Some(AnalysisKind::Ticket),
        confidence: Some(0.95),
        data: Some(serde_json::to_value(payload).unwrap()),
    }
}

/// Scripted vehicle analysis with the given vehicle type.
pub fn vehicle_raw(vehicle_type: Option<&str>) -> RawAnalysis {
    let payload = VehiclePayload {
        vehicle: VehicleAttrs {
            vehicle_type: vehicle_type.map(str::to_string),
            plate_visible: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    RawAnalysis {
        kind: Some(AnalysisKind::Vehicle),
        confidence: Some(0.9),
        data: Some(serde_json::to_value(payload).unwrap()),
    }
}
