use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::{PolicyConfig, UrgencyThresholds};
use crate::models::{ForecastPoint, NormalizedPrediction, RawRecord, Urgency};

use super::error::Rejection;
use super::resolver::{resolve, resolve_id, resolve_opt, resolve_str};

pub(super) const ID_PATHS: &[&str] = &["id", "card_id"];
pub(super) const MEDICINE_PATHS: &[&str] = &[
    "medicine",
    "payload.item_name",
    "payload.request_details.item_requested",
    "item_name",
];
pub(super) const FACILITY_PATHS: &[&str] = &[
    "phc",
    "facility",
    "payload.destination_facility_name",
    "payload.source_facility_name",
    "payload.destination_facility_id",
    "payload.request_details.requestor_phc",
];
pub(super) const PROBLEM_PATHS: &[&str] = &["problem", "ai_rationale_summary"];
pub(super) const URGENCY_PATHS: &[&str] = &["urgency", "severity"];
pub(super) const SCORE_PATHS: &[&str] = &["priority_score", "payload.priority_score"];
pub(super) const HORIZON_PATHS: &[&str] = &["horizonDays", "horizon_days", "horizon"];
pub(super) const CONFIDENCE_PATHS: &[&str] = &["confidence", "confidence_score"];
pub(super) const CREATED_PATHS: &[&str] = &["createdAt", "created_at"];

/// Bring a confidence reading onto the 0–100 scale.
///
/// Backends report either a 0–1 fraction or a percentage; anything at or
/// below 1 is read as a fraction. Non-finite input becomes 0.
pub fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let pct = if raw <= 1.0 { raw * 100.0 } else { raw };
    pct.clamp(0.0, 100.0)
}

/// Urgency for a priority score, used when the card carries no label.
pub fn urgency_for_score(score: f64, thresholds: &UrgencyThresholds) -> Urgency {
    if score >= thresholds.critical {
        Urgency::Critical
    } else if score >= thresholds.high {
        Urgency::High
    } else {
        Urgency::Medium
    }
}

pub fn normalize_prediction(raw: &RawRecord) -> Result<NormalizedPrediction, Rejection> {
    normalize_prediction_with(raw, &PolicyConfig::default())
}

pub fn normalize_prediction_with(
    raw: &RawRecord,
    policy: &PolicyConfig,
) -> Result<NormalizedPrediction, Rejection> {
    if !raw.is_object() {
        return Err(Rejection::NotAnObject);
    }
    let id = resolve_id(raw, ID_PATHS).ok_or(Rejection::MissingId)?;
    let placeholders = &policy.placeholders;

    let medicine = resolve_str(raw, MEDICINE_PATHS, &placeholders.medicine);
    let facility = resolve_str(raw, FACILITY_PATHS, &placeholders.facility);

    let urgency = resolve_opt::<String>(raw, URGENCY_PATHS)
        .and_then(|label| label.parse::<Urgency>().ok())
        .or_else(|| {
            resolve_opt::<f64>(raw, SCORE_PATHS).map(|s| urgency_for_score(s, &policy.urgency))
        })
        .unwrap_or(Urgency::Medium);

    let horizon: u64 = resolve(raw, HORIZON_PATHS, 0);
    let confidence = normalize_confidence(resolve(raw, CONFIDENCE_PATHS, 0.0));

    Ok(NormalizedPrediction {
        title: resolve_opt(raw, &["title"]).unwrap_or_else(|| default_title(&medicine)),
        problem: resolve_str(raw, PROBLEM_PATHS, &placeholders.prediction_problem),
        context: resolve_opt(raw, &["context"]).unwrap_or_else(|| default_context(&facility)),
        urgency,
        horizon_days: u32::try_from(horizon).unwrap_or(u32::MAX),
        confidence,
        created_at: resolve(raw, CREATED_PATHS, DateTime::<Utc>::UNIX_EPOCH),
        sentiment: resolve_opt(raw, &["sentiment"]),
        series: forecast_series(raw),
        id,
        medicine,
        facility,
    })
}

pub(super) fn default_title(medicine: &str) -> String {
    format!("Stockout risk: {medicine}")
}

pub(super) fn default_context(facility: &str) -> String {
    format!("PHC: {facility} - high consumption trend detected")
}

/// Forecast points in feed order; points without a date are dropped.
pub(super) fn forecast_series(raw: &RawRecord) -> Vec<ForecastPoint> {
    let Some(Value::Array(points)) = raw.as_value().get("series") else {
        return Vec::new();
    };
    points
        .iter()
        .filter_map(|point| {
            let point = RawRecord::new(point.clone());
            Some(ForecastPoint {
                date: resolve_opt(&point, &["date"])?,
                forecast: resolve(&point, &["forecast"], 0.0),
                factor_a: resolve_opt(&point, &["factorA", "factor_a"]),
                factor_b: resolve_opt(&point, &["factorB", "factor_b"]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> Result<NormalizedPrediction, Rejection> {
        normalize_prediction(&RawRecord::new(value))
    }

    #[test]
    fn fraction_confidence_scaled_to_percent() {
        assert_eq!(normalize(json!({"id": "x", "confidence": 0.87})).unwrap().confidence, 87.0);
    }

    #[test]
    fn percent_confidence_clamped() {
        assert_eq!(normalize(json!({"id": "x", "confidence": 140})).unwrap().confidence, 100.0);
        assert_eq!(normalize(json!({"id": "x", "confidence": 64})).unwrap().confidence, 64.0);
        assert_eq!(normalize(json!({"id": "x", "confidence": -0.5})).unwrap().confidence, 0.0);
    }

    #[test]
    fn confidence_edge_values() {
        assert_eq!(normalize_confidence(1.0), 100.0);
        assert_eq!(normalize_confidence(0.0), 0.0);
        assert_eq!(normalize_confidence(f64::NAN), 0.0);
        assert_eq!(normalize_confidence(f64::INFINITY), 0.0);
    }

    #[test]
    fn rejects_missing_id() {
        assert_eq!(normalize(json!({})), Err(Rejection::MissingId));
        assert_eq!(normalize(json!({"id": "  "})), Err(Rejection::MissingId));
        assert_eq!(normalize(json!("x")), Err(Rejection::NotAnObject));
    }

    #[test]
    fn full_feed_item() {
        let p = normalize(json!({
            "id": "card-3",
            "title": "Stockout risk: ORS",
            "problem": "Consumption doubled in 5 days",
            "context": "PHC: PHC Andheri - high consumption trend detected",
            "urgency": "Critical",
            "horizonDays": 4,
            "medicine": "ORS",
            "confidence": 92,
            "phc": "PHC Andheri",
            "createdAt": "2026-02-10T09:15:00Z",
            "sentiment": "High urgency",
            "series": [
                {"date": "2026-02-10", "forecast": 50, "factorA": 12, "factorB": 3},
                {"forecast": 47},
                {"date": "2026-02-11", "forecast": 47}
            ]
        }))
        .unwrap();
        assert_eq!(p.urgency, Urgency::Critical);
        assert_eq!(p.horizon_days, 4);
        assert_eq!(p.facility, "PHC Andheri");
        assert_eq!(p.sentiment.as_deref(), Some("High urgency"));
        assert_eq!(p.created_at.to_rfc3339(), "2026-02-10T09:15:00+00:00");
        assert_eq!(p.series.len(), 2);
        assert_eq!(p.series[0].factor_a, Some(12.0));
        assert_eq!(p.series[1].factor_b, None);
    }

    #[test]
    fn raw_solution_card_derives_display_fields() {
        let p = normalize(json!({
            "id": "card-4",
            "priority_score": 7,
            "confidence_score": 0.66,
            "ai_rationale_summary": "Rising fever cases",
            "created_at": "2026-02-10 08:00:00",
            "payload": {
                "request_details": {"item_requested": "Paracetamol", "requestor_phc": "fac_thane_01"}
            }
        }))
        .unwrap();
        assert_eq!(p.medicine, "Paracetamol");
        assert_eq!(p.facility, "fac_thane_01");
        assert_eq!(p.title, "Stockout risk: Paracetamol");
        assert_eq!(p.problem, "Rising fever cases");
        assert_eq!(p.context, "PHC: fac_thane_01 - high consumption trend detected");
        assert_eq!(p.urgency, Urgency::High);
        assert_eq!(p.confidence, 66.0);
    }

    #[test]
    fn unrecognized_urgency_defaults_to_medium() {
        assert_eq!(normalize(json!({"id": "x", "urgency": "apocalyptic"})).unwrap().urgency, Urgency::Medium);
        assert_eq!(normalize(json!({"id": "x"})).unwrap().urgency, Urgency::Medium);
    }

    #[test]
    fn label_beats_score() {
        let p = normalize(json!({"id": "x", "urgency": "high", "priority_score": 10})).unwrap();
        assert_eq!(p.urgency, Urgency::High);
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let p = normalize(json!({"id": "bare"})).unwrap();
        assert_eq!(p.medicine, "Unknown Medicine");
        assert_eq!(p.facility, "Unknown PHC");
        assert_eq!(p.title, "Stockout risk: Unknown Medicine");
        assert_eq!(p.problem, "Predicted stockout risk");
        assert_eq!(p.horizon_days, 0);
        assert_eq!(p.confidence, 0.0);
        assert_eq!(p.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(p.series.is_empty());
        assert!(p.sentiment.is_none());
    }

    #[test]
    fn urgency_score_thresholds() {
        let t = PolicyConfig::default().urgency;
        assert_eq!(urgency_for_score(9.0, &t), Urgency::Critical);
        assert_eq!(urgency_for_score(8.9, &t), Urgency::High);
        assert_eq!(urgency_for_score(7.0, &t), Urgency::High);
        assert_eq!(urgency_for_score(6.9, &t), Urgency::Medium);
    }
}
