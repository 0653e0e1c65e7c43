use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};

use crate::{
    feed::resolve::{text, RawRecord},
    schemas::StatusQuery,
    services::property_feed,
    state::AppState,
};

/// Rentals United sync status: how much of the listings feed is active on
/// the channel and how many listings carry a short-term rental permit.
pub async fn rentals_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    if state.config.pms_api_url.is_none() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(error_body("PMS_API_URL is not set")),
        );
    }

    let feed = match property_feed::fetch_listings(&state.http, &state.config).await {
        Ok(feed) => feed,
        Err(err) => return (err.status_code(), Json(error_body(&err.to_string()))),
    };

    let cc_rental_listings = feed
        .reported_total
        .map(|total| total as usize)
        .unwrap_or(feed.records.len());
    let active = feed
        .records
        .iter()
        .filter(|raw| !is_excluded(raw))
        .count();
    let with_str_permit = feed.records.iter().filter(|raw| has_permit(raw)).count();
    let str_permit_percent = if cc_rental_listings > 0 {
        (with_str_permit as f64 / cc_rental_listings as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    let mut body = json!({
        "ccRentalListings": cc_rental_listings,
        "activeInRentalsUnited": active,
        "excluded": feed.records.len().saturating_sub(active),
        "withStrPermit": with_str_permit,
        "strPermitPercent": str_permit_percent,
        "listings": feed.records,
    });

    if query.debug_enabled() {
        let envelope = feed.first_envelope.as_object();
        body["debug"] = json!({
            "topLevelKeys": envelope
                .map(|env| env.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default(),
            "structureSummary": envelope.map(structure_summary),
            "firstListingKeys": body["listings"]
                .as_array()
                .and_then(|rows| rows.first())
                .and_then(Value::as_object)
                .map(|raw| raw.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default(),
            "sample": body["listings"].as_array().and_then(|rows| rows.first()).cloned(),
            "parsedCount": body["listings"].as_array().map(Vec::len).unwrap_or(0),
            "pagesFetched": feed.pages_fetched,
        });
    }

    (StatusCode::OK, Json(body))
}

fn error_body(message: &str) -> Value {
    json!({
        "error": message,
        "ccRentalListings": 0,
        "activeInRentalsUnited": 0,
        "excluded": 0,
        "withStrPermit": 0,
        "strPermitPercent": 0.0,
        "listings": [],
    })
}

/// The exclude flag arrives as a string, a bool, or nested under
/// `rental_united`.
fn is_excluded(raw: &RawRecord) -> bool {
    let direct = raw
        .get("rental_united_exclude")
        .or_else(|| raw.get("rentalUnitedExclude"));
    let nested = raw
        .get("rental_united")
        .and_then(Value::as_object)
        .and_then(|obj| obj.get("exclude"));
    direct
        .or(nested)
        .map(|value| text(value).eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn has_permit(raw: &RawRecord) -> bool {
    raw.get("short_term_rental_permit_number")
        .or_else(|| raw.get("shortTermRentalPermitNumber"))
        .map(|value| {
            let permit = text(value);
            !permit.is_empty() && !permit.eq_ignore_ascii_case("null")
        })
        .unwrap_or(false)
}

fn structure_summary(envelope: &Map<String, Value>) -> Map<String, Value> {
    envelope
        .iter()
        .map(|(key, value)| {
            let shape = match value {
                Value::Array(items) => format!("array[{}]", items.len()),
                Value::Object(fields) => format!("object{{{} keys}}", fields.len()),
                Value::String(_) => "string".to_string(),
                Value::Number(_) => "number".to_string(),
                Value::Bool(_) => "bool".to_string(),
                Value::Null => "null".to_string(),
            };
            (key.clone(), Value::String(shape))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn exclude_flag_is_read_direct_or_nested() {
        assert!(is_excluded(&record(json!({ "rental_united_exclude": "true" }))));
        assert!(is_excluded(&record(json!({ "rental_united_exclude": true }))));
        assert!(is_excluded(&record(
            json!({ "rental_united": { "exclude": "TRUE" } })
        )));
        assert!(!is_excluded(&record(json!({ "rental_united_exclude": "false" }))));
        assert!(!is_excluded(&record(json!({}))));
    }

    #[test]
    fn permit_requires_a_real_value() {
        assert!(has_permit(&record(
            json!({ "short_term_rental_permit_number": "STR-123" })
        )));
        assert!(!has_permit(&record(
            json!({ "short_term_rental_permit_number": "null" })
        )));
        assert!(!has_permit(&record(
            json!({ "short_term_rental_permit_number": "  " })
        )));
        assert!(!has_permit(&record(json!({}))));
    }
}
