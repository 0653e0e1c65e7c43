use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    error::FeedError,
    feed::{
        aggregate,
        dates::{self, ComparisonPreset, DatePreset},
        kpi::{map_kpi_row, KpiRow},
        resolve,
    },
    schemas::{KpiQuery, KpiSummaryQuery},
    services::property_feed,
    state::AppState,
};

/// Earliest date the debug lease lookup scans back to.
const DEBUG_LOOKUP_FLOOR: &str = "2020-01-01";

fn map_rows(records: &[resolve::RawRecord]) -> Vec<KpiRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| map_kpi_row(raw, index))
        .collect()
}

/// Rentals KPI table. The lease-activity feed is the primary source; when it
/// is unreachable the secondary booking upstream's payload is proxied as-is.
pub async fn rentals_kpi(
    State(state): State<AppState>,
    Query(query): Query<KpiQuery>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let (mut from, mut to) = super::report_window(query.from(), query.to(), today);
    if query.debug_lease_id.is_some() {
        from = DEBUG_LOOKUP_FLOOR.to_string();
        to = dates::iso(today);
    }

    let primary = if state.config.pms_api_url.is_some() {
        Some(
            property_feed::fetch_lease_activity(
                &state.http,
                &state.config,
                &from,
                &to,
                query.status.as_deref(),
            )
            .await,
        )
    } else {
        None
    };

    match primary {
        Some(Ok(records)) => {
            let rows = map_rows(&records);
            let mut body = json!({ "results": rows });

            if query.debug_enabled() {
                let sample = records.first();
                body["debug"] = json!({
                    "keys": sample
                        .map(|raw| raw.keys().cloned().collect::<Vec<_>>())
                        .unwrap_or_default(),
                    "sample": sample.cloned(),
                    "count": records.len(),
                });
            }
            if let Some(lease_id) = query.debug_lease_id.as_deref() {
                body["debug_lease"] = debug_lease(&records, lease_id);
            }
            (StatusCode::OK, Json(body))
        }
        other => {
            if let Some(Err(err)) = &other {
                tracing::warn!(error = %err, "lease-activity feed failed, trying booking upstream");
            }
            secondary_kpi(&state, &from, &to, other.and_then(Result::err)).await
        }
    }
}

fn debug_lease(records: &[resolve::RawRecord], lease_id: &str) -> Value {
    match records
        .iter()
        .find(|raw| resolve::lease_id(raw) == lease_id)
    {
        Some(raw) => json!({
            "lease_id": lease_id,
            "raw": raw,
            "mapped_status": resolve::raw_status(raw),
        }),
        None => json!({
            "lease_id": lease_id,
            "message": "lease not found in the fetched window",
        }),
    }
}

async fn secondary_kpi(
    state: &AppState,
    from: &str,
    to: &str,
    primary_error: Option<FeedError>,
) -> (StatusCode, Json<Value>) {
    if state.config.booking_api_url.is_none() {
        let message = match primary_error {
            Some(err) => format!("{err}. BOOKING_API_URL is not set either."),
            None => "Neither PMS_API_URL nor BOOKING_API_URL is set.".to_string(),
        };
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": message, "results": [] })),
        );
    }

    match property_feed::fetch_booking_kpi(&state.http, &state.config, from, to).await {
        Ok(payload) => (StatusCode::OK, Json(payload)),
        Err(err) => (
            err.status_code(),
            Json(json!({ "error": err.to_string(), "results": [] })),
        ),
    }
}

/// Summary cards: totals for a preset window next to a comparison window,
/// fetched concurrently.
pub async fn rentals_kpi_summary(
    State(state): State<AppState>,
    Query(query): Query<KpiSummaryQuery>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let preset = query
        .preset
        .as_deref()
        .and_then(DatePreset::parse)
        .unwrap_or(DatePreset::ThisYear);
    let comparison = query
        .comparison
        .as_deref()
        .and_then(ComparisonPreset::parse)
        .unwrap_or(ComparisonPreset::SamePeriodLastYear);

    let (from, to) = dates::preset_range(preset, today, 0);
    let (cmp_from, cmp_to) = dates::comparison_range(preset, comparison, today);
    let (from, to) = (dates::iso(from), dates::iso(to));
    let (cmp_from, cmp_to) = (dates::iso(cmp_from), dates::iso(cmp_to));

    let empty = aggregate::totals(&[]);
    if state.config.pms_api_url.is_none() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "PMS_API_URL is not set",
                "fromDate": from,
                "toDate": to,
                "comparisonFromDate": cmp_from,
                "comparisonToDate": cmp_to,
                "totals": &empty,
                "comparisonTotals": &empty,
                "leases": 0,
                "comparisonLeases": 0,
            })),
        );
    }

    let status = query.status.as_deref();
    let (current, previous) = tokio::join!(
        property_feed::fetch_lease_activity(&state.http, &state.config, &from, &to, status),
        property_feed::fetch_lease_activity(&state.http, &state.config, &cmp_from, &cmp_to, status),
    );

    match (current, previous) {
        (Ok(current), Ok(previous)) => {
            let current_rows = map_rows(&current);
            let previous_rows = map_rows(&previous);
            (
                StatusCode::OK,
                Json(json!({
                    "fromDate": from,
                    "toDate": to,
                    "comparisonFromDate": cmp_from,
                    "comparisonToDate": cmp_to,
                    "totals": aggregate::totals(&current_rows),
                    "comparisonTotals": aggregate::totals(&previous_rows),
                    "leases": current_rows.len(),
                    "comparisonLeases": previous_rows.len(),
                })),
            )
        }
        (Err(err), _) | (_, Err(err)) => (
            err.status_code(),
            Json(json!({
                "error": err.to_string(),
                "fromDate": from,
                "toDate": to,
                "comparisonFromDate": cmp_from,
                "comparisonToDate": cmp_to,
                "totals": &empty,
                "comparisonTotals": &empty,
                "leases": 0,
                "comparisonLeases": 0,
            })),
        ),
    }
}
