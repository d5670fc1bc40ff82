use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Urgency;

/// One point of the stock forecast attached to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: String,
    pub forecast: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_b: Option<f64>,
}

/// A stockout prediction card from the alerts feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPrediction {
    pub id: String,
    pub title: String,
    pub problem: String,
    pub context: String,
    pub urgency: Urgency,
    pub horizon_days: u32,
    pub medicine: String,
    /// Percentage, always within [0, 100].
    pub confidence: f64,
    pub facility: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<ForecastPoint>,
}
