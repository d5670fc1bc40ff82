//! Typed views over a report bundle and the summary figures the
//! reports page shows above its charts.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::PolicyConfig;
use crate::csv::CsvTable;
use crate::metrics::{average, ratio_percent, DatedValue, TrendInsights};
use crate::models::{RawRecord, ReportBundle, ReportKind};
use crate::normalize::{normalize_records, resolve, resolve_id, resolve_opt, resolve_str, Rejection};

// ═══════════════════════════════════════════════════════════
// Row types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockoutPoint {
    pub date: String,
    pub predicted: u64,
    pub prevented: u64,
}

/// Average delivery hours per vehicle class on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferTimePoint {
    pub date: String,
    pub bike_hours: f64,
    pub van_hours: f64,
}

/// Units consumed per item on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionPoint {
    pub date: String,
    pub totals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSavedPoint {
    pub period: String,
    pub value_saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiredDrug {
    pub drug: String,
    pub qty: u64,
    pub value_inr: f64,
}

/// One line of the logistics cost breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SopViolation {
    pub id: String,
    pub date: String,
    pub facility: String,
    pub rule: String,
    pub actor: String,
    pub note: String,
}

fn require(raw: &RawRecord, paths: &[&str], field: &'static str) -> Result<String, Rejection> {
    if !raw.is_object() {
        return Err(Rejection::NotAnObject);
    }
    resolve_opt(raw, paths).ok_or(Rejection::MissingField(field))
}

fn stockout_point(raw: &RawRecord) -> Result<StockoutPoint, Rejection> {
    Ok(StockoutPoint {
        date: require(raw, &["date"], "date")?,
        predicted: resolve(raw, &["predicted", "predicted_stockouts"], 0),
        prevented: resolve(raw, &["prevented", "prevented_stockouts"], 0),
    })
}

fn transfer_time_point(raw: &RawRecord) -> Result<TransferTimePoint, Rejection> {
    Ok(TransferTimePoint {
        date: require(raw, &["date"], "date")?,
        bike_hours: resolve(raw, &["bike", "bike_hours"], 0.0),
        van_hours: resolve(raw, &["van", "van_hours"], 0.0),
    })
}

fn consumption_point(raw: &RawRecord) -> Result<ConsumptionPoint, Rejection> {
    let date = require(raw, &["date"], "date")?;
    let totals = raw
        .as_value()
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, _)| key.as_str() != "date")
                .filter_map(|(key, value)| value.as_f64().filter(|v| v.is_finite()).map(|v| (key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();
    Ok(ConsumptionPoint { date, totals })
}

fn value_saved_point(raw: &RawRecord) -> Result<ValueSavedPoint, Rejection> {
    Ok(ValueSavedPoint {
        period: require(raw, &["period", "date"], "period")?,
        value_saved: resolve(raw, &["valueSaved", "value_saved"], 0.0),
    })
}

fn expired_drug(raw: &RawRecord) -> Result<ExpiredDrug, Rejection> {
    Ok(ExpiredDrug {
        drug: require(raw, &["drug", "item_name"], "drug")?,
        qty: resolve(raw, &["qty", "quantity"], 0),
        value_inr: resolve(raw, &["valueINR", "value_inr"], 0.0),
    })
}

fn cost_line(raw: &RawRecord) -> Result<CostLine, Rejection> {
    Ok(CostLine {
        name: require(raw, &["name"], "name")?,
        value: resolve(raw, &["value"], 0.0),
    })
}

fn sop_violation(raw: &RawRecord) -> Result<SopViolation, Rejection> {
    if !raw.is_object() {
        return Err(Rejection::NotAnObject);
    }
    Ok(SopViolation {
        id: resolve_id(raw, &["id"]).ok_or(Rejection::MissingId)?,
        date: resolve_str(raw, &["date"], ""),
        facility: resolve_str(raw, &["facility"], ""),
        rule: resolve_str(raw, &["rule"], ""),
        actor: resolve_str(raw, &["actor"], ""),
        note: resolve_str(raw, &["note"], ""),
    })
}

fn rows<T>(bundle: &ReportBundle, kind: ReportKind, normalizer: fn(&RawRecord) -> Result<T, Rejection>) -> Vec<T> {
    normalize_records(bundle.rows(kind), normalizer, |index, reason| {
        tracing::debug!(kind = %kind, index, %reason, "Dropping report row");
    })
}

// ═══════════════════════════════════════════════════════════
// Bundle views
// ═══════════════════════════════════════════════════════════

pub fn stockout_trend(bundle: &ReportBundle) -> Vec<StockoutPoint> {
    rows(bundle, ReportKind::StockoutTrend, stockout_point)
}

pub fn transfer_trend(bundle: &ReportBundle) -> Vec<TransferTimePoint> {
    rows(bundle, ReportKind::TransferTrend, transfer_time_point)
}

/// Consumption points sorted by date; the backend groups them through a
/// hash map and sends them in no particular order.
pub fn consumption_trend(bundle: &ReportBundle) -> Vec<ConsumptionPoint> {
    let mut points = rows(bundle, ReportKind::ConsumptionTrend, consumption_point);
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

pub fn value_saved(bundle: &ReportBundle) -> Vec<ValueSavedPoint> {
    rows(bundle, ReportKind::ValueSaved, value_saved_point)
}

pub fn top_expired(bundle: &ReportBundle) -> Vec<ExpiredDrug> {
    rows(bundle, ReportKind::TopExpired, expired_drug)
}

pub fn logistics_costs(bundle: &ReportBundle) -> Vec<CostLine> {
    rows(bundle, ReportKind::LogisticsPerformance, cost_line)
}

pub fn sop_violations(bundle: &ReportBundle) -> Vec<SopViolation> {
    rows(bundle, ReportKind::SopViolations, sop_violation)
}

/// Share of approved solution cards, in percent. 0 when the source
/// failed or sent no rate.
pub fn adoption_rate(bundle: &ReportBundle) -> f64 {
    bundle
        .rows(ReportKind::AiAdoption)
        .first()
        .map(|row| resolve(row, &["adoption_rate", "adoptionRate"], 0.0))
        .unwrap_or(0.0)
}

/// Item names present in any consumption point, sorted.
pub fn consumption_items(points: &[ConsumptionPoint]) -> Vec<String> {
    let mut items: Vec<String> = points.iter().flat_map(|p| p.totals.keys().cloned()).collect();
    items.sort();
    items.dedup();
    items
}

/// Stockout trend as an exportable table.
pub fn stockout_csv(bundle: &ReportBundle) -> CsvTable {
    let headers = ["date", "predicted_stockouts", "prevented_stockouts"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = stockout_trend(bundle)
        .into_iter()
        .map(|p| vec![Value::String(p.date), json!(p.predicted), json!(p.prevented)])
        .collect();
    CsvTable::new(headers, rows)
}

// ═══════════════════════════════════════════════════════════
// Summary
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub predicted_stockouts: u64,
    pub prevented_stockouts: u64,
    /// Prevented over predicted, in percent. `None` only when nothing was
    /// predicted and the policy renders that as "N/A".
    pub prevention_rate: Option<f64>,
    pub avg_bike_hours: f64,
    pub avg_van_hours: f64,
    pub total_value_saved: f64,
    /// Expired drug with the highest loss.
    pub top_expiry_loss: Option<ExpiredDrug>,
    pub total_logistics_cost: f64,
    pub adoption_rate: f64,
    pub sop_violation_count: usize,
    /// Daily prevention rate over time. Days with nothing predicted are
    /// left out when the policy has no value for them.
    pub prevention_insights: TrendInsights,
}

impl ReportSummary {
    pub fn from_bundle(bundle: &ReportBundle, policy: &PolicyConfig) -> Self {
        let stockouts = stockout_trend(bundle);
        let transfers = transfer_trend(bundle);
        let predicted: u64 = stockouts.iter().map(|p| p.predicted).sum();
        let prevented: u64 = stockouts.iter().map(|p| p.prevented).sum();

        let daily_rates: Vec<DatedValue> = stockouts
            .iter()
            .filter_map(|p| {
                ratio_percent(p.prevented as f64, p.predicted as f64, policy.zero_denominator)
                    .map(|rate| DatedValue::new(p.date.clone(), rate))
            })
            .collect();

        let top_expiry_loss = top_expired(bundle)
            .into_iter()
            .fold(None::<ExpiredDrug>, |top, drug| match top {
                Some(t) if t.value_inr >= drug.value_inr => Some(t),
                _ => Some(drug),
            });

        Self {
            predicted_stockouts: predicted,
            prevented_stockouts: prevented,
            prevention_rate: ratio_percent(prevented as f64, predicted as f64, policy.zero_denominator),
            avg_bike_hours: average(&transfers, |t| t.bike_hours),
            avg_van_hours: average(&transfers, |t| t.van_hours),
            total_value_saved: value_saved(bundle).iter().map(|v| v.value_saved).sum(),
            top_expiry_loss,
            total_logistics_cost: logistics_costs(bundle).iter().map(|c| c.value).sum(),
            adoption_rate: adoption_rate(bundle),
            sop_violation_count: sop_violations(bundle).len(),
            prevention_insights: TrendInsights::from_series(&daily_rates, policy),
        }
    }
}
