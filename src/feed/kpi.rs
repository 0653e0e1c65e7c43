//! Lease-activity record to KPI row mapping.

use serde::{Deserialize, Serialize};

use super::resolve::{self, pick, RawRecord};

/// Fixed-shape row behind the rentals KPI table. Field names are the wire
/// format the admin pages key on; `contract_data` is a historical wire name
/// for the contract date and must stay spelled that way.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KpiRow {
    pub booking_id: i64,
    pub lease_id: String,
    #[serde(rename = "contract_data")]
    pub contract_date: String,
    pub agent_name: String,
    pub address: String,
    pub status: String,
    pub gross_rent: f64,
    pub total_commission: f64,
    pub office_commission: f64,
    pub booking_fee: f64,
    pub total_revenue: f64,
}

/// Pure mapping; never fails. Every field defaults to 0 or empty when the
/// feed omits it. `index` backs the synthetic booking id.
pub fn map_kpi_row(raw: &RawRecord, index: usize) -> KpiRow {
    let contract_date = resolve::contract_date(raw);

    let booking_id_raw = resolve::number(pick(raw, &["booking_id", "bookingId"]));
    let booking_id = if booking_id_raw == 0.0 {
        (index + 1) as i64
    } else {
        booking_id_raw as i64
    };

    let lease_id = {
        let id = resolve::lease_id(raw);
        if id.is_empty() {
            booking_id.to_string()
        } else {
            id
        }
    };

    let agent_commission = resolve::number(pick(raw, &["agent_commission", "agentCommission"]));
    let office_commission = resolve::number(pick(raw, &["office_commission", "officeCommission"]));
    let processing_fee = resolve::number(pick(raw, &["processing_fee", "processingFee"]));
    let nr_booking_fee = resolve::number(pick(raw, &["nr_booking_fee", "nrBookingFee"]));
    let booking_fee = processing_fee + nr_booking_fee;

    KpiRow {
        booking_id,
        lease_id,
        contract_date,
        agent_name: resolve::agent_name(raw),
        address: resolve::address(raw),
        status: resolve::raw_status(raw),
        gross_rent: resolve::number(pick(raw, &["gross_rent", "grossRent", "rent"])),
        // agent_commission may be absent or negative in source data, so the
        // total is allowed to be inconsistent with office_commission.
        total_commission: agent_commission + office_commission,
        office_commission,
        booking_fee,
        total_revenue: office_commission + booking_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn string_amounts_are_coerced_and_revenue_derived() {
        let row = map_kpi_row(
            &record(json!({
                "office_commission": "150.5",
                "nr_booking_fee": "10",
            })),
            0,
        );
        assert_eq!(row.office_commission, 150.5);
        assert_eq!(row.booking_fee, 10.0);
        assert_eq!(row.total_revenue, 160.5);
    }

    #[test]
    fn agent_name_is_first_token_only() {
        let row = map_kpi_row(&record(json!({ "agent_name": "Jane Smith" })), 0);
        assert_eq!(row.agent_name, "Jane");
    }

    #[test]
    fn booking_and_lease_ids_fall_back_to_index() {
        let row = map_kpi_row(&record(json!({})), 4);
        assert_eq!(row.booking_id, 5);
        assert_eq!(row.lease_id, "5");

        let row = map_kpi_row(&record(json!({ "booking_id": 77 })), 0);
        assert_eq!(row.booking_id, 77);
        assert_eq!(row.lease_id, "77");

        let row = map_kpi_row(&record(json!({ "lease_number": "L-9", "booking_id": 77 })), 0);
        assert_eq!(row.lease_id, "L-9");
    }

    #[test]
    fn empty_record_maps_to_zeroed_row() {
        let row = map_kpi_row(&record(json!({})), 0);
        assert_eq!(row.gross_rent, 0.0);
        assert_eq!(row.total_commission, 0.0);
        assert_eq!(row.status, "");
        assert_eq!(row.address, "");
    }

    #[test]
    fn negative_agent_commission_is_not_clamped_on_the_row() {
        let row = map_kpi_row(
            &record(json!({ "agent_commission": -50, "office_commission": 30 })),
            0,
        );
        assert_eq!(row.total_commission, -20.0);
        assert_eq!(row.office_commission, 30.0);
    }

    #[test]
    fn wire_name_for_contract_date_is_contract_data() {
        let row = map_kpi_row(&record(json!({ "contract_date": "2024-03-01" })), 0);
        let wire = serde_json::to_value(&row).unwrap();
        assert_eq!(wire.get("contract_data"), Some(&json!("2024-03-01")));
        assert!(wire.get("contract_date").is_none());
    }
}
