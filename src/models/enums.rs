use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A backend string did not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + FromStr + string serde.
///
/// The first literal is the canonical wire spelling; extra literals are
/// accepted aliases. Matching is case-insensitive and ignores surrounding
/// whitespace, since backend versions disagree on casing.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $(
                    if needle.eq_ignore_ascii_case($s) $(|| needle.eq_ignore_ascii_case($alias))* {
                        return Ok(Self::$variant);
                    }
                )+
                Err(UnknownVariant {
                    kind: stringify!($name),
                    value: s.into(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Urgency {
    Critical => "Critical",
    High => "High",
    Medium => "Medium",
});

str_enum!(Priority {
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});

str_enum!(TransferStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    InTransit => "IN_TRANSIT" | "in transit" | "in-transit",
    Delivered => "DELIVERED" | "completed",
    Cancelled => "CANCELLED" | "canceled",
    Unknown => "UNKNOWN",
});

str_enum!(TrendDirection {
    Improving => "Improving",
    Declining => "Declining",
    Stable => "Stable",
});

str_enum!(StabilityClass {
    VeryStable => "Very stable",
    ModerateFluctuation => "Moderate fluctuation",
    HighlyUnstable => "Highly unstable",
});

str_enum!(ReportKind {
    StockoutTrend => "stockoutTrend" | "stockout-trend",
    TransferTrend => "transferTrend" | "transfer-trend",
    ConsumptionTrend => "consumptionTrend" | "consumption-trend",
    ValueSaved => "valueSaved" | "value-saved",
    TopExpired => "topExpired" | "top-expired",
    SopViolations => "sopViolations" | "sop-violations",
    AiAdoption => "aiAdoption" | "ai-adoption",
    LogisticsPerformance => "logisticsPerformance" | "logistics-performance",
});

impl ReportKind {
    /// Endpoint path relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::StockoutTrend => "/api/reports/stockout-trend",
            Self::TransferTrend => "/api/reports/transfer-trend",
            Self::ConsumptionTrend => "/api/reports/consumption-trend",
            Self::ValueSaved => "/api/reports/value-saved",
            Self::TopExpired => "/api/reports/top-expired",
            Self::SopViolations => "/api/reports/sop-violations",
            Self::AiAdoption => "/api/reports/ai-adoption",
            Self::LogisticsPerformance => "/api/reports/logistics-performance",
        }
    }
}

str_enum!(ApprovalAction {
    Approve => "approve",
    Reject => "reject",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn urgency_parses_any_casing() {
        assert_eq!(Urgency::from_str("critical").unwrap(), Urgency::Critical);
        assert_eq!(Urgency::from_str(" HIGH ").unwrap(), Urgency::High);
        assert_eq!(Urgency::from_str("Medium").unwrap(), Urgency::Medium);
        assert!(Urgency::from_str("severe").is_err());
    }

    #[test]
    fn transfer_status_accepts_backend_aliases() {
        for (raw, expected) in [
            ("DELIVERED", TransferStatus::Delivered),
            ("completed", TransferStatus::Delivered),
            ("COMPLETED", TransferStatus::Delivered),
            ("IN_TRANSIT", TransferStatus::InTransit),
            ("in transit", TransferStatus::InTransit),
            ("canceled", TransferStatus::Cancelled),
            ("pending", TransferStatus::Pending),
        ] {
            assert_eq!(TransferStatus::from_str(raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn priority_serializes_upper_case() {
        let json = serde_json::to_string(&Priority::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
        let back: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(back, Priority::Low);
    }

    #[test]
    fn stability_class_labels() {
        assert_eq!(StabilityClass::VeryStable.as_str(), "Very stable");
        assert_eq!(StabilityClass::ModerateFluctuation.as_str(), "Moderate fluctuation");
        assert_eq!(StabilityClass::HighlyUnstable.as_str(), "Highly unstable");
    }

    #[test]
    fn report_kind_keys_and_endpoints() {
        assert_eq!(ReportKind::ALL.len(), 8);
        assert_eq!(ReportKind::StockoutTrend.as_str(), "stockoutTrend");
        assert_eq!(ReportKind::from_str("top-expired").unwrap(), ReportKind::TopExpired);
        for kind in ReportKind::ALL {
            assert!(kind.endpoint().starts_with("/api/reports/"));
        }
    }

    #[test]
    fn unknown_variant_names_the_enum() {
        let err = ReportKind::from_str("weather").unwrap_err();
        assert_eq!(err.kind, "ReportKind");
        assert_eq!(err.to_string(), "Unknown ReportKind value: weather");
    }
}
