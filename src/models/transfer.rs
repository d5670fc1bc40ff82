use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::TransferStatus;

/// A stock transfer between two facilities, as tracked by drivers and PHCs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransfer {
    pub id: String,
    pub item: String,
    pub quantity: u32,
    pub from_facility: String,
    pub to_facility: String,
    pub status: TransferStatus,
    pub vehicle: String,
    pub created_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl NormalizedTransfer {
    /// Delivery time in hours, when both timestamps are known and ordered.
    pub fn delivery_hours(&self) -> Option<f64> {
        let (start, end) = (self.created_at?, self.delivered_at?);
        let secs = (end - start).num_seconds();
        (secs >= 0).then(|| secs as f64 / 3600.0)
    }
}
