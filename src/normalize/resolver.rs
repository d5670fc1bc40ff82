//! Field resolution across backend schema variants.
//!
//! Callers list every known key path for a field, newest schema first,
//! and take the first one that yields a usable value. A miss is never an
//! error: the caller's fallback comes back instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::RawRecord;

/// A type that can be read out of a JSON value found at a key path.
///
/// Returning `None` means "present but unusable", and resolution moves
/// on to the next candidate path.
pub trait Resolvable: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl Resolvable for Value {
    fn from_json(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Non-blank strings only; a blank string is treated as missing.
impl Resolvable for String {
    fn from_json(value: &Value) -> Option<Self> {
        let s = value.as_str()?.trim();
        (!s.is_empty()).then(|| s.to_string())
    }
}

/// Finite numbers, including numbers sent as strings.
impl Resolvable for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        let n = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

/// Non-negative whole numbers. Fractional values are truncated.
impl Resolvable for u64 {
    fn from_json(value: &Value) -> Option<Self> {
        if let Some(n) = value.as_u64() {
            return Some(n);
        }
        let n = f64::from_json(value)?;
        (n >= 0.0).then(|| n.trunc() as u64)
    }
}

impl Resolvable for bool {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// Timestamps as RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or bare dates.
impl Resolvable for DateTime<Utc> {
    fn from_json(value: &Value) -> Option<Self> {
        parse_timestamp(value.as_str()?)
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Walk a dotted key path. Hitting a non-object midway, a missing key or
/// a JSON null all count as "not found".
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// First usable value across `paths`, in the order given.
pub fn resolve_opt<T: Resolvable>(record: &RawRecord, paths: &[&str]) -> Option<T> {
    paths
        .iter()
        .filter_map(|path| lookup(record.as_value(), path))
        .find_map(T::from_json)
}

/// First usable value across `paths`, or `fallback` when none resolves.
pub fn resolve<T: Resolvable>(record: &RawRecord, paths: &[&str], fallback: T) -> T {
    resolve_opt(record, paths).unwrap_or(fallback)
}

/// String field with an owned fallback; shorthand for the common case.
pub fn resolve_str(record: &RawRecord, paths: &[&str], fallback: &str) -> String {
    resolve_opt(record, paths).unwrap_or_else(|| fallback.to_string())
}

/// Record identity: non-blank strings, or integers rendered as text.
pub fn resolve_id(record: &RawRecord, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(record.as_value(), path))
        .find_map(|value| match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            other => String::from_json(other),
        })
}
