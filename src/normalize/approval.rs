use crate::config::{PolicyConfig, PriorityThresholds};
use crate::models::{NormalizedApproval, Priority, RawRecord};

use super::error::Rejection;
use super::resolver::{resolve, resolve_id, resolve_str};

const ID_PATHS: &[&str] = &["id", "card_id", "solution_card_id"];
const SCORE_PATHS: &[&str] = &["priority_score", "payload.priority_score", "priority"];
const ITEM_PATHS: &[&str] = &[
    "payload.item_name",
    "payload.request_details.item_requested",
    "item_name",
    "item.name",
];
const QUANTITY_PATHS: &[&str] = &[
    "payload.quantity",
    "payload.request_details.quantity_needed",
    "quantity",
];
const SOURCE_PATHS: &[&str] = &[
    "payload.source_facility_name",
    "payload.recommendation.from_phc",
    "source_facility_name",
    "from_facility_id",
    "from_facilityid",
];
const DESTINATION_PATHS: &[&str] = &[
    "payload.destination_facility_name",
    "payload.recommendation.to_phc",
    "destination_facility_name",
    "to_facility_id",
    "to_facilityid",
];
const REASON_PATHS: &[&str] = &["ai_rationale_summary", "payload.ai_rationale_summary", "reason"];
const TRANSPORT_PATHS: &[&str] = &["payload.transport_mode", "transport_mode", "vehicle_type"];

/// Priority tier for a score; thresholds are inclusive lower bounds.
pub fn priority_for_score(score: f64, thresholds: &PriorityThresholds) -> Priority {
    if score >= thresholds.high {
        Priority::High
    } else if score >= thresholds.medium {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Normalize a solution card into an approval queue entry using the
/// default policy.
pub fn normalize_approval(raw: &RawRecord) -> Result<NormalizedApproval, Rejection> {
    normalize_approval_with(raw, &PolicyConfig::default())
}

pub fn normalize_approval_with(
    raw: &RawRecord,
    policy: &PolicyConfig,
) -> Result<NormalizedApproval, Rejection> {
    if !raw.is_object() {
        return Err(Rejection::NotAnObject);
    }
    let id = resolve_id(raw, ID_PATHS).ok_or(Rejection::MissingId)?;
    let placeholders = &policy.placeholders;

    let score = resolve(raw, SCORE_PATHS, 0.0);
    let item = resolve_str(raw, ITEM_PATHS, &placeholders.item);
    // f64 Display prints whole numbers without a fractional part.
    let quantity: f64 = resolve(raw, QUANTITY_PATHS, 0.0);
    let source = resolve_str(raw, SOURCE_PATHS, &placeholders.source_facility);
    let destination = resolve_str(raw, DESTINATION_PATHS, &placeholders.destination_facility);
    let transport = resolve_str(raw, TRANSPORT_PATHS, &placeholders.transport);

    Ok(NormalizedApproval {
        id,
        facility: destination,
        request_summary: format!("{quantity} units of {item}"),
        reason_summary: resolve_str(raw, REASON_PATHS, &placeholders.approval_reason),
        solution_summary: format!("Transfer from {source}"),
        logistics_summary: format!("{transport} • AI Optimized Route"),
        priority: priority_for_score(score, &policy.priority),
        priority_score: score,
    })
}
