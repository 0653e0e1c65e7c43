use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    feed::{ppc, resolve},
    schemas::PpcQuery,
    services::property_feed,
    state::AppState,
};

const LEASE_SAMPLE_LIMIT: usize = 100;

/// PPC lead report: inquiries from the rental-opportunity feed matched
/// against lease activity by contact email.
pub async fn ppc_leads(
    State(state): State<AppState>,
    Query(query): Query<PpcQuery>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let (from, to) = super::report_window(query.from.as_deref(), query.to.as_deref(), today);

    if state.config.pms_api_url.is_none() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "PMS_API_URL is not set", "rows": [] })),
        );
    }
    if state.config.pms_jwt.is_none() && state.config.pms_api_key.is_none() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "No feed credentials configured. Set PMS_JWT or PMS_API_KEY.",
                "rows": [],
            })),
        );
    }

    if query.debug.as_deref() == Some("lease_feed") {
        return lease_feed_debug(&state, &from, &to).await;
    }
    if let Some(lease_id) = query.lease_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return lease_lookup(&state, &from, &to, lease_id).await;
    }

    let debug = matches!(query.debug.as_deref(), Some("1") | Some("true"));
    let max_pages = if debug { 1 } else { property_feed::OPPORTUNITY_PAGE_CAP };
    let opportunities =
        match property_feed::fetch_opportunities(&state.http, &state.config, max_pages).await {
            Ok(feed) => feed,
            Err(err) => {
                let mut message = err.to_string();
                if err.is_unauthorized() {
                    message.push_str(" Rental-opportunity requires a JWT. Set PMS_JWT.");
                }
                return (
                    err.status_code(),
                    Json(json!({ "error": message, "rows": [] })),
                );
            }
        };

    if debug {
        let first = opportunities.records.first();
        return (
            StatusCode::OK,
            Json(json!({
                "debug": true,
                "fromDate": from,
                "toDate": to,
                "pages": opportunities.pages_fetched,
                "total_records": opportunities.records.len(),
                "envelope_keys": opportunities
                    .first_envelope
                    .as_object()
                    .map(|env| env.keys().cloned().collect::<Vec<_>>())
                    .unwrap_or_default(),
                "first_keys": first
                    .map(|raw| raw.keys().cloned().collect::<Vec<_>>())
                    .unwrap_or_default(),
                "sample": first.cloned(),
            })),
        );
    }

    // Lease feed failure degrades to zero matches so the inquiry table still
    // renders; the partial failure is reported inline on the 200.
    let mut partial_error = None;
    let leases = match property_feed::fetch_lease_activity(
        &state.http,
        &state.config,
        &from,
        &to,
        None,
    )
    .await
    {
        Ok(records) => ppc::leases_by_email(&records),
        Err(err) => {
            tracing::warn!(error = %err, "lease feed unavailable, rows will show no matches");
            partial_error = Some(format!("Lease matching skipped: {err}"));
            HashMap::new()
        }
    };

    let rows = ppc::build_rows(&opportunities.records, &leases, &from, &to);
    let mut body = json!({ "rows": rows, "fromDate": from, "toDate": to });
    if let Some(error) = partial_error {
        body["error"] = json!(error);
    }
    (StatusCode::OK, Json(body))
}

async fn lease_feed_debug(
    state: &AppState,
    from: &str,
    to: &str,
) -> (StatusCode, Json<Value>) {
    match property_feed::fetch_lease_activity(&state.http, &state.config, from, to, None).await {
        Ok(records) => {
            let sample: Vec<Value> = records
                .iter()
                .take(LEASE_SAMPLE_LIMIT)
                .map(|raw| {
                    let email = resolve::tenant_email(raw);
                    let date = resolve::contract_date(raw);
                    json!({
                        "lease_id": resolve::lease_id(raw),
                        "tenant_email": (!email.is_empty()).then_some(email),
                        "contract_date": (!date.is_empty()).then_some(date),
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({
                    "debug": "lease_feed",
                    "fromDate": from,
                    "toDate": to,
                    "total_leases": records.len(),
                    "sample_lease_emails": sample,
                })),
            )
        }
        Err(err) => (
            err.status_code(),
            Json(json!({ "error": err.to_string(), "rows": [] })),
        ),
    }
}

async fn lease_lookup(
    state: &AppState,
    from: &str,
    to: &str,
    lease_id: &str,
) -> (StatusCode, Json<Value>) {
    match property_feed::fetch_lease_activity(&state.http, &state.config, from, to, None).await {
        Ok(records) => match records.iter().find(|raw| resolve::lease_id(raw) == lease_id) {
            Some(raw) => (
                StatusCode::OK,
                Json(json!({
                    "lease_id": lease_id,
                    "tenant_email": resolve::tenant_email(raw),
                    "contract_date": resolve::contract_date(raw),
                    "raw_keys": raw.keys().cloned().collect::<Vec<_>>(),
                })),
            ),
            None => (
                StatusCode::OK,
                Json(json!({
                    "lease_id": lease_id,
                    "message": "lease not found in the fetched window",
                    "fromDate": from,
                    "toDate": to,
                })),
            ),
        },
        Err(err) => (
            err.status_code(),
            Json(json!({ "error": err.to_string(), "rows": [] })),
        ),
    }
}
