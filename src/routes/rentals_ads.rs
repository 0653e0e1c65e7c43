use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{schemas::AdsQuery, services::google_ads, state::AppState};

/// Total Google Ads campaign spend for the window. The account reports in
/// USD.
pub async fn rentals_ads(
    State(state): State<AppState>,
    Query(query): Query<AdsQuery>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let (from, to) = super::report_window(query.from.as_deref(), query.to.as_deref(), today);

    let creds = match google_ads::credentials(&state.config) {
        Ok(creds) => creds,
        Err(err) => {
            return (
                err.status_code(),
                Json(json!({
                    "error": err.to_string(),
                    "totalSpend": 0.0,
                    "currencyCode": "USD",
                    "fromDate": from,
                    "toDate": to,
                })),
            );
        }
    };

    match google_ads::fetch_total_spend(&state.http, &creds, &from, &to).await {
        Ok(total_spend) => (
            StatusCode::OK,
            Json(json!({
                "totalSpend": total_spend,
                "currencyCode": "USD",
                "fromDate": from,
                "toDate": to,
            })),
        ),
        Err(err) => (
            err.status_code(),
            Json(json!({
                "error": err.to_string(),
                "totalSpend": 0.0,
                "currencyCode": "USD",
                "fromDate": from,
                "toDate": to,
            })),
        ),
    }
}
