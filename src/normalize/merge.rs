//! Merging a fresh detail fetch into data already on screen.
//!
//! Precedence: a non-null fresh field wins; a null or missing fresh field
//! keeps the displayed value. Nested objects merge key by key.

use serde_json::{Map, Value};

use crate::config::PolicyConfig;
use crate::models::{NormalizedPrediction, RawRecord, Urgency};

use super::prediction::{
    default_context, default_title, forecast_series, normalize_confidence, urgency_for_score,
    CONFIDENCE_PATHS, CREATED_PATHS, FACILITY_PATHS, HORIZON_PATHS, ID_PATHS, MEDICINE_PATHS,
    PROBLEM_PATHS, SCORE_PATHS, URGENCY_PATHS,
};
use super::resolver::{resolve_id, resolve_opt};

/// Merge two raw values under the fresh-non-null-wins rule.
pub fn merge_partial(display: &Value, fresh: &Value) -> Value {
    match (display, fresh) {
        (_, Value::Null) => display.clone(),
        (Value::Object(shown), Value::Object(update)) => {
            let mut merged: Map<String, Value> = shown.clone();
            for (key, value) in update {
                if value.is_null() {
                    continue;
                }
                let next = match shown.get(key) {
                    Some(existing) => merge_partial(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

/// Apply a fresh detail payload to a prediction already on screen.
///
/// A payload carrying a different id belongs to another card and is
/// ignored, so a late response for a previously selected card cannot
/// overwrite the current one. A title or context that was derived from
/// the medicine or facility is derived again when those change and the
/// payload brings no text of its own.
pub fn merge_prediction(
    current: &NormalizedPrediction,
    fresh: &RawRecord,
    policy: &PolicyConfig,
) -> NormalizedPrediction {
    if !fresh.is_object() {
        return current.clone();
    }
    if let Some(id) = resolve_id(fresh, ID_PATHS) {
        if id != current.id {
            tracing::debug!(shown = %current.id, fresh = %id, "Ignoring detail for another card");
            return current.clone();
        }
    }

    let mut merged = current.clone();
    if let Some(problem) = resolve_opt(fresh, PROBLEM_PATHS) {
        merged.problem = problem;
    }
    if let Some(medicine) = resolve_opt(fresh, MEDICINE_PATHS) {
        merged.medicine = medicine;
    }
    if let Some(facility) = resolve_opt(fresh, FACILITY_PATHS) {
        merged.facility = facility;
    }
    merged.title = match resolve_opt(fresh, &["title"]) {
        Some(title) => title,
        None if current.title == default_title(&current.medicine) => default_title(&merged.medicine),
        None => current.title.clone(),
    };
    merged.context = match resolve_opt(fresh, &["context"]) {
        Some(context) => context,
        None if current.context == default_context(&current.facility) => default_context(&merged.facility),
        None => current.context.clone(),
    };
    let urgency = resolve_opt::<String>(fresh, URGENCY_PATHS)
        .and_then(|label| label.parse::<Urgency>().ok())
        .or_else(|| resolve_opt::<f64>(fresh, SCORE_PATHS).map(|s| urgency_for_score(s, &policy.urgency)));
    if let Some(urgency) = urgency {
        merged.urgency = urgency;
    }
    if let Some(horizon) = resolve_opt::<u64>(fresh, HORIZON_PATHS) {
        merged.horizon_days = u32::try_from(horizon).unwrap_or(u32::MAX);
    }
    if let Some(confidence) = resolve_opt::<f64>(fresh, CONFIDENCE_PATHS) {
        merged.confidence = normalize_confidence(confidence);
    }
    if let Some(created_at) = resolve_opt(fresh, CREATED_PATHS) {
        merged.created_at = created_at;
    }
    if let Some(sentiment) = resolve_opt(fresh, &["sentiment"]) {
        merged.sentiment = Some(sentiment);
    }
    let series = forecast_series(fresh);
    if !series.is_empty() {
        merged.series = series;
    }
    merged
}
