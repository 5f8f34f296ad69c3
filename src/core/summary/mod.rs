//! Batch summary aggregation
//!
//! Pure reduction of per-image outcomes into [`BatchSummary`]. Error and
//! unknown outcomes contribute to neither count. The combined total is only
//! emitted across a currency-homogeneous set of two or more tickets; a
//! single ticket missing its currency voids the combination even when every
//! present currency agrees.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::types::payload::{TicketMeta, TicketTotals, VehicleAttrs};
use crate::core::types::{AnalysisKind, AnalysisOutcome, BatchSummary, CombinedTotal};

/// Reduce outcomes into summary statistics.
pub fn summarize(outcomes: &[AnalysisOutcome]) -> BatchSummary {
    let tickets: Vec<&Value> = outcomes
        .iter()
        .filter(|o| o.kind == AnalysisKind::Ticket)
        .map(|o| &o.data)
        .collect();
    let vehicles: Vec<&Value> = outcomes
        .iter()
        .filter(|o| o.kind == AnalysisKind::Vehicle)
        .map(|o| &o.data)
        .collect();

    let mut vehicle_types = BTreeMap::new();
    for data in &vehicles {
        let attrs: VehicleAttrs = section(data, "vehicle");
        let kind = attrs
            .vehicle_type
            .unwrap_or_else(|| "unknown".to_string());
        *vehicle_types.entry(kind).or_insert(0) += 1;
    }

    BatchSummary {
        total_tickets: tickets.len(),
        vehicles_detected: vehicles.len(),
        vehicle_types,
        combined_total: combined_total(&tickets),
    }
}

/// Compute the combined ticket total, or `None` when the cross-ticket
/// currency invariant does not hold.
fn combined_total(tickets: &[&Value]) -> Option<CombinedTotal> {
    if tickets.len() < 2 {
        return None;
    }

    let mut amount = 0.0f64;
    let mut currency: Option<String> = None;
    for data in tickets {
        let totals: TicketTotals = section(data, "totals");
        amount += totals.total.unwrap_or(0.0);

        let meta: TicketMeta = section(data, "ticket");
        // `?` here voids the combination on the first currency-less ticket
        let this = meta.currency?;
        match &currency {
            None => currency = Some(this),
            Some(agreed) if *agreed == this => {}
            Some(_) => return None,
        }
    }

    Some(CombinedTotal {
        amount: round_cents(amount),
        currency: currency?,
    })
}

/// Round half away from zero on the cent boundary.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Deserialize one payload section leniently; anything missing or malformed
/// becomes the section's default.
fn section<T: DeserializeOwned + Default>(data: &Value, key: &str) -> T {
    data.get(key)
        .cloned()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket(total: Option<f64>, currency: Option<&str>) -> AnalysisOutcome {
        AnalysisOutcome {
            image_id: "img_0".to_string(),
            kind: AnalysisKind::Ticket,
            confidence: 0.9,
            data: json!({
                "ticket": { "currency": currency },
                "totals": { "total": total },
            }),
        }
    }

    fn vehicle(vehicle_type: Option<&str>) -> AnalysisOutcome {
        AnalysisOutcome {
            image_id: "img_0".to_string(),
            kind: AnalysisKind::Vehicle,
            confidence: 0.9,
            data: json!({ "vehicle": { "vehicle_type": vehicle_type } }),
        }
    }

    #[test]
    fn counts_partition_by_kind() {
        let outcomes = vec![
            ticket(Some(10.0), Some("EUR")),
            vehicle(Some("car")),
            AnalysisOutcome::failed("img_3".to_string(), "broken"),
            AnalysisOutcome {
                image_id: "img_4".to_string(),
                kind: AnalysisKind::Unknown,
                confidence: 0.0,
                data: json!({}),
            },
        ];
        let summary = summarize(&outcomes);
        assert_eq!(summary.total_tickets, 1);
        assert_eq!(summary.vehicles_detected, 1);
    }

    #[test]
    fn shared_currency_tickets_combine() {
        let outcomes = vec![
            ticket(Some(10.0), Some("EUR")),
            ticket(Some(5.0), Some("EUR")),
        ];
        let combined = summarize(&outcomes).combined_total.unwrap();
        assert_eq!(combined.amount, 15.0);
        assert_eq!(combined.currency, "EUR");
    }

    #[test]
    fn mixed_currencies_void_the_combination() {
        let outcomes = vec![
            ticket(Some(10.0), Some("EUR")),
            ticket(Some(5.0), Some("USD")),
        ];
        assert!(summarize(&outcomes).combined_total.is_none());
    }

    #[test]
    fn one_null_currency_voids_the_combination() {
        let outcomes = vec![ticket(Some(10.0), Some("EUR")), ticket(Some(5.0), None)];
        assert!(summarize(&outcomes).combined_total.is_none());
    }

    #[test]
    fn a_single_ticket_never_combines() {
        let outcomes = vec![ticket(Some(10.0), Some("EUR"))];
        assert!(summarize(&outcomes).combined_total.is_none());
    }

    #[test]
    fn missing_totals_count_as_zero() {
        let outcomes = vec![ticket(None, Some("EUR")), ticket(Some(5.0), Some("EUR"))];
        let combined = summarize(&outcomes).combined_total.unwrap();
        assert_eq!(combined.amount, 5.0);
    }

    #[test]
    fn amounts_round_on_the_cent_boundary() {
        let outcomes = vec![
            ticket(Some(0.1), Some("EUR")),
            ticket(Some(0.2), Some("EUR")),
        ];
        let combined = summarize(&outcomes).combined_total.unwrap();
        assert_eq!(combined.amount, 0.3);
    }

    #[test]
    fn vehicle_types_histogram_defaults_missing_to_unknown() {
        let outcomes = vec![
            vehicle(Some("car")),
            vehicle(Some("car")),
            vehicle(Some("truck")),
            vehicle(None),
            AnalysisOutcome {
                image_id: "img_5".to_string(),
                kind: AnalysisKind::Vehicle,
                confidence: 0.5,
                data: json!({}),
            },
        ];
        let summary = summarize(&outcomes);
        assert_eq!(summary.vehicle_types["car"], 2);
        assert_eq!(summary.vehicle_types["truck"], 1);
        assert_eq!(summary.vehicle_types["unknown"], 2);
    }

    #[test]
    fn malformed_ticket_section_counts_as_missing_currency() {
        let broken = AnalysisOutcome {
            image_id: "img_1".to_string(),
            kind: AnalysisKind::Ticket,
            confidence: 0.4,
            data: json!({ "ticket": "not an object", "totals": { "total": 2.0 } }),
        };
        let outcomes = vec![broken, ticket(Some(5.0), Some("EUR"))];
        assert!(summarize(&outcomes).combined_total.is_none());
    }
}
