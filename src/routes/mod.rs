use axum::{routing::get, routing::post, Router};
use chrono::{Datelike, NaiveDate};

use crate::feed::dates;
use crate::state::AppState;

pub mod get_in_touch;
pub mod health;
pub mod ppc_leads;
pub mod rentals_ads;
pub mod rentals_charts;
pub mod rentals_kpi;
pub mod rentals_status;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/rentals-kpi", get(rentals_kpi::rentals_kpi))
        .route("/rentals-kpi/summary", get(rentals_kpi::rentals_kpi_summary))
        .route("/ppc-leads", get(ppc_leads::ppc_leads))
        .route("/rentals-ads", get(rentals_ads::rentals_ads))
        .route("/rentals-status", get(rentals_status::rentals_status))
        .route("/rentals-charts", get(rentals_charts::rentals_charts))
        .route("/get-in-touch", post(get_in_touch::get_in_touch))
}

/// Report window defaults: Jan 1 of the current year through today.
pub(crate) fn report_window(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> (String, String) {
    let from = from
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| format!("{}-01-01", today.year()));
    let to = to
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| dates::iso(today));
    (from, to)
}
