//! Application constants, normalization policy and API client settings.
//!
//! The policy thresholds (priority tiers, urgency tiers, stability bands)
//! were lifted from the dashboard call sites and are business policy, so
//! they live here instead of being hardcoded in the normalizers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Supplydesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base URL when `SUPPLYDESK_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default bundle deadline when `SUPPLYDESK_DEADLINE_SECS` is unset.
pub const DEFAULT_DEADLINE_SECS: u64 = 15;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "supplydesk=info,warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid policy document: {0}")]
    Policy(#[from] serde_json::Error),

    #[error("Inconsistent policy: {0}")]
    Inconsistent(String),
}

// ═══════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════

/// What a ratio with a zero denominator renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDenominator {
    /// Render as 0%.
    Zero,
    /// Render as 100% (nothing to prevent, nothing missed).
    Full,
    /// No value; presentation shows "N/A".
    NotApplicable,
}

/// Score thresholds (inclusive lower bounds) for the approval priority tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityThresholds {
    pub high: f64,
    pub medium: f64,
}

/// Score thresholds (inclusive lower bounds) for prediction urgency when
/// the backend sends a score but no urgency label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub critical: f64,
    pub high: f64,
}

/// Standard-deviation band edges for stability classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityBands {
    /// σ below this is "Very stable".
    pub moderate_from: f64,
    /// σ at or above this is "Highly unstable".
    pub unstable_from: f64,
}

/// Placeholder text substituted for missing values in display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub item: String,
    pub medicine: String,
    pub facility: String,
    pub source_facility: String,
    pub destination_facility: String,
    pub transport: String,
    pub approval_reason: String,
    pub prediction_problem: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            item: "Unknown Item".into(),
            medicine: "Unknown Medicine".into(),
            facility: "Unknown PHC".into(),
            source_facility: "Warehouse".into(),
            destination_facility: "Clinic".into(),
            transport: "Van".into(),
            approval_reason: "Stockout predicted by AI".into(),
            prediction_problem: "Predicted stockout risk".into(),
        }
    }
}

/// Normalization and metrics policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub priority: PriorityThresholds,
    pub urgency: UrgencyThresholds,
    pub stability: StabilityBands,
    /// Trailing window (points) for trend and stability insights.
    pub trend_window: usize,
    pub zero_denominator: ZeroDenominator,
    pub placeholders: Placeholders,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            priority: PriorityThresholds { high: 9.0, medium: 5.0 },
            urgency: UrgencyThresholds { critical: 9.0, high: 7.0 },
            stability: StabilityBands { moderate_from: 3.0, unstable_from: 6.0 },
            trend_window: 7,
            zero_denominator: ZeroDenominator::Zero,
            placeholders: Placeholders::default(),
        }
    }
}

impl PolicyConfig {
    /// Parse a policy override document. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let policy: PolicyConfig = serde_json::from_str(text)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject tier orderings the classifiers cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.priority.medium > self.priority.high {
            return Err(ConfigError::Inconsistent(format!(
                "priority medium ({}) above high ({})",
                self.priority.medium, self.priority.high
            )));
        }
        if self.urgency.high > self.urgency.critical {
            return Err(ConfigError::Inconsistent(format!(
                "urgency high ({}) above critical ({})",
                self.urgency.high, self.urgency.critical
            )));
        }
        if self.stability.moderate_from > self.stability.unstable_from {
            return Err(ConfigError::Inconsistent(format!(
                "stability moderate band ({}) above unstable band ({})",
                self.stability.moderate_from, self.stability.unstable_from
            )));
        }
        if self.trend_window < 2 {
            return Err(ConfigError::Inconsistent(format!(
                "trend window must cover at least 2 points, got {}",
                self.trend_window
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// API client settings
// ═══════════════════════════════════════════════════════════

/// Where the dashboard API lives and how long a bundle may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub deadline: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            token: None,
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

impl ClientConfig {
    /// Read `SUPPLYDESK_API_URL`, `SUPPLYDESK_API_TOKEN` and
    /// `SUPPLYDESK_DEADLINE_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("SUPPLYDESK_API_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        config.token = lookup("SUPPLYDESK_API_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(raw) = lookup("SUPPLYDESK_DEADLINE_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SUPPLYDESK_DEADLINE_SECS",
                value: raw.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "SUPPLYDESK_DEADLINE_SECS",
                    value: raw,
                });
            }
            config.deadline = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
