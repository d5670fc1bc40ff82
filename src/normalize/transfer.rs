use crate::config::PolicyConfig;
use crate::models::{NormalizedTransfer, RawRecord, TransferStatus};

use super::error::Rejection;
use super::resolver::{resolve, resolve_id, resolve_opt, resolve_str};

const ID_PATHS: &[&str] = &["id", "transfer_id"];
const ITEM_PATHS: &[&str] = &["item.name", "item.generic_name", "item_name", "payload.item_name", "item_id"];
const QUANTITY_PATHS: &[&str] = &["quantity", "payload.quantity"];
const FROM_PATHS: &[&str] = &[
    "origin.name",
    "from_facility.name",
    "from_facility_name",
    "source_facility_name",
    "from_facility_id",
];
const TO_PATHS: &[&str] = &[
    "destination.name",
    "to_facility.name",
    "to_facility_name",
    "destination_facility_name",
    "to_facility_id",
];
const VEHICLE_PATHS: &[&str] = &["vehicle_type", "transport_mode", "payload.transport_mode"];

pub fn normalize_transfer(raw: &RawRecord) -> Result<NormalizedTransfer, Rejection> {
    normalize_transfer_with(raw, &PolicyConfig::default())
}

pub fn normalize_transfer_with(
    raw: &RawRecord,
    policy: &PolicyConfig,
) -> Result<NormalizedTransfer, Rejection> {
    if !raw.is_object() {
        return Err(Rejection::NotAnObject);
    }
    let id = resolve_id(raw, ID_PATHS).ok_or(Rejection::MissingId)?;
    let placeholders = &policy.placeholders;

    let quantity: u64 = resolve(raw, QUANTITY_PATHS, 0);
    let status = resolve_opt::<String>(raw, &["status"])
        .and_then(|s| s.parse().ok())
        .unwrap_or(TransferStatus::Unknown);

    Ok(NormalizedTransfer {
        id,
        item: resolve_str(raw, ITEM_PATHS, &placeholders.item),
        quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
        from_facility: resolve_str(raw, FROM_PATHS, &placeholders.source_facility),
        to_facility: resolve_str(raw, TO_PATHS, &placeholders.destination_facility),
        status,
        vehicle: resolve_str(raw, VEHICLE_PATHS, &placeholders.transport),
        created_at: resolve_opt(raw, &["created_at", "createdAt"]),
        delivered_at: resolve_opt(raw, &["actual_delivery_time", "delivered_at"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joined_driver_task_row() {
        let raw = RawRecord::new(json!({
            "id": "t-9",
            "quantity": 50,
            "status": "IN_TRANSIT",
            "vehicle_type": "BIKE",
            "item": {"name": "Insulin", "generic_name": "insulin glargine"},
            "origin": {"name": "PHC Andheri", "district": "Mumbai"},
            "to_facility_id": "fac_bandra_02",
            "created_at": "2026-03-01T08:00:00Z",
            "actual_delivery_time": null
        }));
        let t = normalize_transfer(&raw).unwrap();
        assert_eq!(t.item, "Insulin");
        assert_eq!(t.from_facility, "PHC Andheri");
        assert_eq!(t.to_facility, "fac_bandra_02");
        assert_eq!(t.status, TransferStatus::InTransit);
        assert_eq!(t.vehicle, "BIKE");
        assert!(t.created_at.is_some());
        assert!(t.delivered_at.is_none());
    }

    #[test]
    fn completed_status_spellings_all_mean_delivered() {
        for status in ["DELIVERED", "completed", "COMPLETED"] {
            let raw = RawRecord::new(json!({"id": "t", "status": status}));
            assert_eq!(normalize_transfer(&raw).unwrap().status, TransferStatus::Delivered);
        }
    }

    #[test]
    fn bare_row_uses_placeholders() {
        let t = normalize_transfer(&RawRecord::new(json!({"id": 12, "status": "LOST"}))).unwrap();
        assert_eq!(t.id, "12");
        assert_eq!(t.item, "Unknown Item");
        assert_eq!(t.quantity, 0);
        assert_eq!(t.from_facility, "Warehouse");
        assert_eq!(t.to_facility, "Clinic");
        assert_eq!(t.vehicle, "Van");
        assert_eq!(t.status, TransferStatus::Unknown);
    }

    #[test]
    fn rejects_without_id() {
        assert_eq!(normalize_transfer(&RawRecord::new(json!({"quantity": 5}))), Err(Rejection::MissingId));
    }
}
