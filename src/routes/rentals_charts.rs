use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Utc};
use serde_json::json;

use crate::{
    feed::{
        aggregate::{self, StatusFilter},
        dates,
        kpi::{map_kpi_row, KpiRow},
    },
    schemas::ChartsQuery,
    services::property_feed,
    state::AppState,
};

/// Years covered by the charts, newest last.
const CHART_YEAR_SPAN: i32 = 5;

/// Multi-year charts: one year-to-date KPI window per year, fetched
/// concurrently. A failed year logs and charts as empty rather than failing
/// the whole response.
pub async fn rentals_charts(
    State(state): State<AppState>,
    Query(query): Query<ChartsQuery>,
) -> impl IntoResponse {
    if state.config.pms_api_url.is_none() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "PMS_API_URL is not set",
                "years": [],
                "agentYears": [],
                "agents": [],
            })),
        );
    }

    let today = Utc::now().date_naive();
    let current_year = today.year();
    let filter = StatusFilter::parse(query.status.as_deref());

    let mut handles = Vec::new();
    for year in (current_year - CHART_YEAR_SPAN + 1)..=current_year {
        let state = state.clone();
        let (from, to) = dates::ytd_range(year, today);
        handles.push((
            year,
            tokio::spawn(async move {
                property_feed::fetch_lease_activity(
                    &state.http,
                    &state.config,
                    &dates::iso(from),
                    &dates::iso(to),
                    None,
                )
                .await
            }),
        ));
    }

    let mut per_year: Vec<(i32, Vec<KpiRow>)> = Vec::new();
    for (year, handle) in handles {
        let records = match handle.await {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                tracing::warn!(year, error = %err, "chart year fetch failed");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(year, error = %err, "chart year task panicked");
                Vec::new()
            }
        };
        let rows = records
            .iter()
            .enumerate()
            .map(|(index, raw)| map_kpi_row(raw, index))
            .collect();
        per_year.push((year, aggregate::apply_status_filter(rows, filter)));
    }

    let agent = query
        .agent
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let years: Vec<_> = per_year
        .iter()
        .map(|(year, rows)| aggregate::year_summary(*year, rows))
        .collect();
    let agent_years: Vec<_> = per_year
        .iter()
        .map(|(year, rows)| aggregate::agent_year_summary(*year, rows, agent))
        .collect();
    let agents = aggregate::ordered_agents(
        per_year.iter().flat_map(|(_, rows)| rows.iter()),
        &state.config.preferred_agent_order,
    );

    (
        StatusCode::OK,
        Json(json!({
            "years": years,
            "agentYears": agent_years,
            "agents": agents,
        })),
    )
}
