//! Derived metrics over normalized collections.
//!
//! Every function here is total: empty inputs, zero denominators and
//! non-finite values produce a defined result, never NaN.

use serde::Serialize;

use crate::config::{PolicyConfig, StabilityBands, ZeroDenominator};
use crate::models::{NormalizedApproval, NormalizedPrediction, Priority, StabilityClass, TrendDirection, Urgency};

/// Arithmetic mean of `selector` over `items`. 0 for an empty slice.
/// Non-finite selections are skipped.
pub fn average<T, F>(items: &[T], selector: F) -> f64
where
    F: Fn(&T) -> f64,
{
    mean(&items.iter().map(selector).collect::<Vec<_>>())
}

fn mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    finite.iter().sum::<f64>() / finite.len() as f64
}

pub fn count_where<T, P>(items: &[T], predicate: P) -> usize
where
    P: Fn(&T) -> bool,
{
    items.iter().filter(|item| predicate(item)).count()
}

/// Trailing `window` values of `values` (all of them when shorter).
pub fn trailing(values: &[f64], window: usize) -> &[f64] {
    &values[values.len().saturating_sub(window)..]
}

/// Compare the first and last value of the trailing window.
pub fn trend_direction(values: &[f64], window: usize) -> TrendDirection {
    let tail = trailing(values, window);
    if tail.len() < 2 {
        return TrendDirection::Stable;
    }
    let (first, last) = (tail[0], tail[tail.len() - 1]);
    if last > first {
        TrendDirection::Improving
    } else if last < first {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

/// Population standard deviation. 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let mu = mean(&finite);
    let variance = finite.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / finite.len() as f64;
    variance.sqrt()
}

/// Band a standard deviation. Lower band edges are inclusive.
pub fn classify_std_dev(sigma: f64, bands: &StabilityBands) -> StabilityClass {
    if sigma < bands.moderate_from {
        StabilityClass::VeryStable
    } else if sigma < bands.unstable_from {
        StabilityClass::ModerateFluctuation
    } else {
        StabilityClass::HighlyUnstable
    }
}

pub fn stability_class(values: &[f64], bands: &StabilityBands) -> StabilityClass {
    classify_std_dev(population_std_dev(values), bands)
}

/// `numerator / denominator` as a percentage.
///
/// A zero (or non-finite) denominator is resolved by `policy`; `None`
/// only for [`ZeroDenominator::NotApplicable`].
pub fn ratio_percent(numerator: f64, denominator: f64, policy: ZeroDenominator) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return match policy {
            ZeroDenominator::Zero => Some(0.0),
            ZeroDenominator::Full => Some(100.0),
            ZeroDenominator::NotApplicable => None,
        };
    }
    Some(numerator / denominator * 100.0)
}

// ═══════════════════════════════════════════════════════════
// Collection stats
// ═══════════════════════════════════════════════════════════

/// Header stats for the prediction feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total: usize,
    /// Mean confidence rounded to a whole percent.
    pub avg_confidence: f64,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
}

impl PredictionStats {
    pub fn from_predictions(predictions: &[NormalizedPrediction]) -> Self {
        let with = |u: Urgency| count_where(predictions, |p| p.urgency == u);
        Self {
            total: predictions.len(),
            avg_confidence: average(predictions, |p| p.confidence).round(),
            critical_count: with(Urgency::Critical),
            high_count: with(Urgency::High),
            medium_count: with(Urgency::Medium),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ApprovalStats {
    pub fn from_approvals(approvals: &[NormalizedApproval]) -> Self {
        let with = |p: Priority| count_where(approvals, |a| a.priority == p);
        Self {
            total: approvals.len(),
            high: with(Priority::High),
            medium: with(Priority::Medium),
            low: with(Priority::Low),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Trend insights
// ═══════════════════════════════════════════════════════════

/// One value of a dated series. Dates are ISO-8601, so they sort as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: String,
    pub value: f64,
}

impl DatedValue {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// Summary of a dated series for the network-health panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendInsights {
    /// Trailing window, oldest first.
    pub recent: Vec<DatedValue>,
    pub direction: TrendDirection,
    /// Highest value over the whole series.
    pub best: Option<DatedValue>,
    /// Lowest value over the whole series.
    pub worst: Option<DatedValue>,
    pub std_dev: f64,
    pub stability: StabilityClass,
}

impl TrendInsights {
    /// Sort by date, then derive direction and stability from the
    /// trailing window and best/worst from the whole series. Non-finite
    /// values are dropped first.
    pub fn from_series(points: &[DatedValue], policy: &PolicyConfig) -> Self {
        let mut sorted: Vec<DatedValue> = points.iter().filter(|p| p.value.is_finite()).cloned().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));

        let start = sorted.len().saturating_sub(policy.trend_window);
        let recent = sorted[start..].to_vec();
        let values: Vec<f64> = recent.iter().map(|p| p.value).collect();
        let std_dev = population_std_dev(&values);

        // Ties resolve to the latest point.
        let best = sorted
            .iter()
            .fold(None::<&DatedValue>, |acc, p| match acc {
                Some(b) if b.value > p.value => Some(b),
                _ => Some(p),
            })
            .cloned();
        let worst = sorted
            .iter()
            .fold(None::<&DatedValue>, |acc, p| match acc {
                Some(w) if w.value < p.value => Some(w),
                _ => Some(p),
            })
            .cloned();

        Self {
            direction: trend_direction(&values, policy.trend_window),
            recent,
            best,
            worst,
            std_dev,
            stability: classify_std_dev(std_dev, &policy.stability),
        }
    }
}
