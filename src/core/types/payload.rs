//! Typed payload shapes for ticket and vehicle analyses
//!
//! These mirror the JSON the vision model is prompted to produce. Every leaf
//! is optional and every struct defaults, so a partially filled model
//! response still deserializes; the aggregator reads sections individually
//! and treats anything malformed as absent.

use serde::{Deserialize, Serialize};

/// Structured receipt / ticket extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketPayload {
    pub merchant: Merchant,
    pub ticket: TicketMeta,
    pub items: Vec<LineItem>,
    pub totals: TicketTotals,
    pub raw_text: Option<String>,
    pub warnings: Vec<String>,
}

/// Merchant identification block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Merchant {
    pub name: Option<String>,
    pub address: Option<String>,
    pub vat_number: Option<String>,
}

/// Ticket-level metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketMeta {
    /// Purchase date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Purchase time, `HH:MM`
    pub time: Option<String>,
    /// ISO currency code as printed on the ticket
    pub currency: Option<String>,
    /// True when the currency was inferred from merchant location rather
    /// than printed
    pub currency_inferred: Option<bool>,
}

/// One purchased item line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub category: Option<String>,
    pub confidence: Option<f32>,
}

/// Ticket totals block. `total` is the final consumer price inclusive of
/// all taxes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketTotals {
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    /// Individual tax breakdown lines (IVA 21%, VAT, GST...)
    pub tax_lines: Vec<TaxLine>,
    pub total: Option<f64>,
}

/// One tax breakdown line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxLine {
    pub name: Option<String>,
    pub rate: Option<f64>,
    pub base: Option<f64>,
    pub amount: Option<f64>,
}

/// Structured vehicle / license plate extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehiclePayload {
    pub vehicle: VehicleAttrs,
    pub detection: Detection,
    pub raw_text: Option<String>,
    pub warnings: Vec<String>,
}

/// Vehicle attributes as read from the image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleAttrs {
    /// Plate text, uppercase without spaces; null when unreadable
    pub license_plate: Option<String>,
    pub plate_visible: Option<bool>,
    /// One of `occluded`, `blurry`, `angle`, `damaged`, `not_present`
    pub plate_unreadable_reason: Option<String>,
    pub country: Option<String>,
    /// One of `car`, `truck`, `motorcycle`, `bus`, `van`, `other`
    pub vehicle_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

/// Detection geometry block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
    pub bounding_box: Option<BoundingBox>,
}

/// Normalized bounding box, coordinates in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
