//! Concurrent report fetching with per-source isolation.
//!
//! Every source is polled to completion (or to the shared deadline); a
//! failed source only ever affects its own section of the bundle.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use serde_json::Value;
use tokio::time::Instant;

use crate::models::{RawRecord, ReportBundle, ReportKind};

use super::error::SourceError;

/// A pending fetch for one report kind.
pub type SourceFuture<'a> = BoxFuture<'a, Result<Value, SourceError>>;

/// One report kind, the operation that fetches it, and what it
/// contributes when that operation fails.
pub struct BundleSource<'a> {
    kind: ReportKind,
    fetch: SourceFuture<'a>,
    fallback: Vec<RawRecord>,
}

impl<'a> BundleSource<'a> {
    pub fn new<F>(kind: ReportKind, fetch: F) -> Self
    where
        F: Future<Output = Result<Value, SourceError>> + Send + 'a,
    {
        Self {
            kind,
            fetch: Box::pin(fetch),
            fallback: Vec::new(),
        }
    }

    /// Rows to use when the fetch fails. Defaults to none.
    pub fn with_fallback(mut self, rows: Vec<RawRecord>) -> Self {
        self.fallback = rows;
        self
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }
}

/// Split a report payload into rows.
///
/// Arrays yield their elements, a lone object (scalar reports such as AI
/// adoption) yields one row, and null means no rows. Anything else is a
/// malformed payload.
pub fn payload_rows(payload: Value) -> Result<Vec<RawRecord>, SourceError> {
    match payload {
        Value::Array(items) => Ok(items.into_iter().map(RawRecord::new).collect()),
        Value::Object(_) => Ok(vec![RawRecord::new(payload)]),
        Value::Null => Ok(Vec::new()),
        other => Err(SourceError::MalformedPayload(format!(
            "expected rows, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Run all sources concurrently and assemble one bundle.
///
/// Waits for every source to settle; with a `deadline`, sources still
/// pending when it passes are treated as failed. The bundle has exactly
/// one section per distinct requested kind. When a kind is listed twice
/// the first source is used.
pub async fn fetch_bundle(sources: Vec<BundleSource<'_>>, deadline: Option<Duration>) -> ReportBundle {
    let cutoff = deadline.map(|d| Instant::now() + d);
    let mut requested = BTreeSet::new();
    let mut pending = Vec::with_capacity(sources.len());

    for source in sources {
        if !requested.insert(source.kind) {
            tracing::warn!(kind = %source.kind, "Duplicate report source ignored");
            continue;
        }
        pending.push(settle(source, cutoff));
    }

    let mut bundle = ReportBundle::empty(requested);
    let mut failed = 0usize;
    for (kind, outcome) in join_all(pending).await {
        match outcome {
            Ok(rows) => bundle.insert(kind, rows),
            Err(rows) => {
                failed += 1;
                bundle.insert(kind, rows);
            }
        }
    }

    if failed > 0 && failed == bundle.len() {
        tracing::warn!(sources = failed, "Every report source failed, bundle holds fallbacks only");
    } else {
        tracing::debug!(sections = bundle.len(), failed, "Report bundle assembled");
    }
    bundle
}

/// Drive one source to a settled outcome: `Ok(rows)` on success,
/// `Err(fallback)` on any failure.
async fn settle(
    source: BundleSource<'_>,
    cutoff: Option<Instant>,
) -> (ReportKind, Result<Vec<RawRecord>, Vec<RawRecord>>) {
    let BundleSource { kind, fetch, fallback } = source;

    let outcome = match cutoff {
        Some(at) => tokio::time::timeout_at(at, fetch)
            .await
            .unwrap_or(Err(SourceError::Timeout)),
        None => fetch.await,
    };

    match outcome.and_then(payload_rows) {
        Ok(rows) => {
            tracing::debug!(kind = %kind, rows = rows.len(), "Report source settled");
            (kind, Ok(rows))
        }
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Report source failed, using fallback");
            (kind, Err(fallback))
        }
    }
}
