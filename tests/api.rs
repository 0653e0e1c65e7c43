//! Router-level tests against an unconfigured application: every reporting
//! endpoint must degrade to a well-formed payload instead of panicking.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use rentals_admin::config::AppConfig;
use rentals_admin::state::AppState;

fn test_router() -> axum::Router {
    let state = AppState::build(AppConfig::default()).expect("client builds");
    rentals_admin::build_router(state)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = test_router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_answers_ok() {
    let (status, body) = get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["now"].is_string());
}

#[tokio::test]
async fn kpi_without_config_is_503_with_empty_results() {
    let (status, body) = get("/api/rentals-kpi").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["results"], serde_json::json!([]));
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("PMS_API_URL") || error.contains("BOOKING_API_URL"));
}

#[tokio::test]
async fn kpi_summary_without_config_keeps_zeroed_totals() {
    let (status, body) = get("/api/rentals-kpi/summary?preset=this_month").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["leases"], 0);
    assert_eq!(body["totals"]["totalRevenue"], 0.0);
    assert!(body["fromDate"].is_string());
    assert!(body["comparisonToDate"].is_string());
}

#[tokio::test]
async fn ppc_leads_without_config_is_503_with_empty_rows() {
    let (status, body) = get("/api/ppc-leads").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["rows"], serde_json::json!([]));
    assert!(body["error"].as_str().unwrap().contains("PMS_API_URL"));
}

#[tokio::test]
async fn ads_without_credentials_names_the_missing_variables() {
    let (status, body) = get("/api/rentals-ads").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["totalSpend"], 0.0);
    assert_eq!(body["currencyCode"], "USD");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("GOOGLE_ADS_CLIENT_ID"));
}

#[tokio::test]
async fn status_without_config_reports_zeroed_metrics() {
    let (status, body) = get("/api/rentals-status").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ccRentalListings"], 0);
    assert_eq!(body["listings"], serde_json::json!([]));
}

#[tokio::test]
async fn charts_without_config_return_empty_series() {
    let (status, body) = get("/api/rentals-charts").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["years"], serde_json::json!([]));
    assert_eq!(body["agents"], serde_json::json!([]));
}

#[tokio::test]
async fn get_in_touch_rejects_a_missing_email() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/get-in-touch")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "not-an-email"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("valid email"));
}
