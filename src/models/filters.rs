use serde::{Deserialize, Serialize};

use super::enums::Urgency;
use super::prediction::NormalizedPrediction;

/// Horizon buckets offered by the alerts filter bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonBucket {
    #[default]
    All,
    /// Fewer than 7 days.
    UnderWeek,
    /// 7 to 14 days inclusive.
    OneToTwoWeeks,
}

impl HorizonBucket {
    pub fn contains(&self, horizon_days: u32) -> bool {
        match self {
            Self::All => true,
            Self::UnderWeek => horizon_days < 7,
            Self::OneToTwoWeeks => (7..=14).contains(&horizon_days),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionFilter {
    pub urgency: Option<Urgency>,
    pub medicine: Option<String>,
    pub horizon: HorizonBucket,
}

impl PredictionFilter {
    pub fn matches(&self, prediction: &NormalizedPrediction) -> bool {
        if let Some(urgency) = self.urgency {
            if prediction.urgency != urgency {
                return false;
            }
        }
        if let Some(ref medicine) = self.medicine {
            if &prediction.medicine != medicine {
                return false;
            }
        }
        self.horizon.contains(prediction.horizon_days)
    }

    /// Visible predictions, in feed order.
    pub fn apply<'a>(&self, predictions: &'a [NormalizedPrediction]) -> Vec<&'a NormalizedPrediction> {
        predictions.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct values for the filter dropdowns, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub urgencies: Vec<Urgency>,
    pub medicines: Vec<String>,
}

impl FilterOptions {
    pub fn from_predictions(predictions: &[NormalizedPrediction]) -> Self {
        let mut options = Self::default();
        for p in predictions {
            if !options.urgencies.contains(&p.urgency) {
                options.urgencies.push(p.urgency);
            }
            if !options.medicines.contains(&p.medicine) {
                options.medicines.push(p.medicine.clone());
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn prediction(id: &str, urgency: Urgency, medicine: &str, horizon_days: u32) -> NormalizedPrediction {
        NormalizedPrediction {
            id: id.into(),
            title: format!("Stockout risk: {medicine}"),
            problem: String::new(),
            context: String::new(),
            urgency,
            horizon_days,
            medicine: medicine.into(),
            confidence: 80.0,
            facility: "PHC Andheri".into(),
            created_at: DateTime::UNIX_EPOCH,
            sentiment: None,
            series: vec![],
        }
    }

    fn feed() -> Vec<NormalizedPrediction> {
        vec![
            prediction("1", Urgency::Critical, "ORS", 3),
            prediction("2", Urgency::High, "Insulin", 7),
            prediction("3", Urgency::Critical, "Insulin", 14),
            prediction("4", Urgency::Medium, "ORS", 20),
        ]
    }

    fn ids(visible: Vec<&NormalizedPrediction>) -> Vec<&str> {
        visible.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn default_filter_shows_everything() {
        let feed = feed();
        assert_eq!(ids(PredictionFilter::default().apply(&feed)), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn urgency_and_medicine_combine() {
        let feed = feed();
        let filter = PredictionFilter {
            urgency: Some(Urgency::Critical),
            medicine: Some("Insulin".into()),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&feed)), vec!["3"]);
    }

    #[test]
    fn horizon_buckets_are_inclusive_at_seven_and_fourteen() {
        let feed = feed();
        let under = PredictionFilter { horizon: HorizonBucket::UnderWeek, ..Default::default() };
        assert_eq!(ids(under.apply(&feed)), vec!["1"]);
        let weeks = PredictionFilter { horizon: HorizonBucket::OneToTwoWeeks, ..Default::default() };
        assert_eq!(ids(weeks.apply(&feed)), vec!["2", "3"]);
    }

    #[test]
    fn options_are_distinct_in_feed_order() {
        let options = FilterOptions::from_predictions(&feed());
        assert_eq!(options.urgencies, vec![Urgency::Critical, Urgency::High, Urgency::Medium]);
        assert_eq!(options.medicines, vec!["ORS".to_string(), "Insulin".to_string()]);
    }
}
