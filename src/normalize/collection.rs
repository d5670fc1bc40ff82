use serde_json::Value;

use crate::config::PolicyConfig;
use crate::models::{ApprovalQueue, RawRecord};

use super::approval::normalize_approval_with;
use super::error::Rejection;

/// Normalize every element of a raw list, dropping rejected elements.
///
/// Accepted elements keep their input order. A payload that is not an
/// array yields an empty list.
pub fn normalize_collection<T, F>(raw: &RawRecord, normalizer: F) -> Vec<T>
where
    F: Fn(&RawRecord) -> Result<T, Rejection>,
{
    normalize_collection_with(raw, normalizer, |_, _| {})
}

/// Like [`normalize_collection`], reporting each rejection (input index
/// and reason) to `on_reject`.
pub fn normalize_collection_with<T, F, R>(raw: &RawRecord, normalizer: F, on_reject: R) -> Vec<T>
where
    F: Fn(&RawRecord) -> Result<T, Rejection>,
    R: FnMut(usize, &Rejection),
{
    let Some(items) = raw.as_value().as_array() else {
        tracing::debug!("Collection payload is not an array, treating as empty");
        return Vec::new();
    };
    let records: Vec<RawRecord> = items.iter().cloned().map(RawRecord::new).collect();
    normalize_records(&records, normalizer, on_reject)
}

/// Slice form, for rows that are already split (e.g. bundle sections).
pub fn normalize_records<T, F, R>(records: &[RawRecord], normalizer: F, mut on_reject: R) -> Vec<T>
where
    F: Fn(&RawRecord) -> Result<T, Rejection>,
    R: FnMut(usize, &Rejection),
{
    let mut accepted = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match normalizer(record) {
            Ok(item) => accepted.push(item),
            Err(reason) => {
                tracing::debug!(index, %reason, "Dropping malformed record");
                on_reject(index, &reason);
            }
        }
    }
    if accepted.len() < records.len() {
        tracing::debug!(
            accepted = accepted.len(),
            dropped = records.len() - accepted.len(),
            "Collection normalized with drops"
        );
    }
    accepted
}

/// Stable sort by score, highest first. Equal scores keep their
/// relative input order.
pub fn sort_by_score_desc<T, S>(items: &mut [T], score: S)
where
    S: Fn(&T) -> f64,
{
    items.sort_by(|a, b| score(b).total_cmp(&score(a)));
}

/// The approval-queue endpoint answers with an array of cards, a single
/// card (focus mode) or nothing. Always hand back an array.
pub fn queue_records(payload: &RawRecord) -> RawRecord {
    match payload.as_value() {
        Value::Array(_) => payload.clone(),
        Value::Object(_) => RawRecord::new(Value::Array(vec![payload.as_value().clone()])),
        _ => RawRecord::new(Value::Array(Vec::new())),
    }
}

/// Normalize an approval-queue payload in server order.
pub fn normalize_queue(payload: &RawRecord, policy: &PolicyConfig) -> ApprovalQueue {
    let records = queue_records(payload);
    ApprovalQueue::new(normalize_collection(&records, |r| normalize_approval_with(r, policy)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::normalize::{normalize_approval, normalize_prediction};
    use serde_json::json;

    #[test]
    fn drops_invalid_and_keeps_order() {
        let raw = RawRecord::new(json!([
            {"id": "1", "medicine": "ORS"},
            {"medicine": "no id"},
            {"id": "3", "medicine": "Insulin"}
        ]));
        let out = normalize_collection(&raw, normalize_prediction);
        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn empty_record_is_excluded() {
        let raw = RawRecord::new(json!([{}]));
        assert!(normalize_collection(&raw, normalize_prediction).is_empty());
    }

    #[test]
    fn rejections_are_reported_with_index() {
        let raw = RawRecord::new(json!([{"id": "a"}, 5, {}, {"id": "d"}]));
        let mut rejected = Vec::new();
        let out = normalize_collection_with(&raw, normalize_approval, |i, r| rejected.push((i, r.clone())));
        assert_eq!(out.len(), 2);
        assert_eq!(rejected, vec![(1, Rejection::NotAnObject), (2, Rejection::MissingId)]);
    }

    #[test]
    fn non_array_payload_yields_empty() {
        for payload in [json!(null), json!({"id": "x"}), json!("rows"), json!(12)] {
            let raw = RawRecord::new(payload);
            assert!(normalize_collection(&raw, normalize_approval).is_empty());
        }
    }

    #[test]
    fn score_sort_is_stable_descending() {
        let raw = RawRecord::new(json!([
            {"id": "a", "priority_score": 5},
            {"id": "b", "priority_score": 9},
            {"id": "c", "priority_score": 5},
            {"id": "d", "priority_score": 7},
            {"id": "e", "priority_score": 9}
        ]));
        let mut out = normalize_collection(&raw, normalize_approval);
        sort_by_score_desc(&mut out, |a| a.priority_score);
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "d", "a", "c"]);
    }

    #[test]
    fn queue_accepts_single_card_and_null() {
        let policy = PolicyConfig::default();
        let single = normalize_queue(&RawRecord::new(json!({"id": "solo", "priority_score": 9})), &policy);
        assert_eq!(single.len(), 1);
        assert_eq!(single.head().unwrap().priority, Priority::High);

        assert!(normalize_queue(&RawRecord::new(json!(null)), &policy).is_empty());

        let list = normalize_queue(&RawRecord::new(json!([{"id": "a"}, {"id": "b"}])), &policy);
        assert_eq!(list.len(), 2);
    }
}
