//! Reductions over normalized KPI rows for the chart and summary endpoints,
//! plus the presentation-layer status heuristics.

use serde::Serialize;

use super::kpi::KpiRow;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub leases: usize,
    pub total_revenue: f64,
    pub total_commission: f64,
    pub office_commission: f64,
    /// Office share of total commission in percent; 0 when there is no
    /// commission at all, never NaN or infinite.
    pub office_pct: f64,
}

pub fn year_summary(year: i32, rows: &[KpiRow]) -> YearSummary {
    let total_revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
    let total_commission: f64 = rows.iter().map(|r| r.total_commission).sum();
    let office_commission: f64 = rows.iter().map(|r| r.office_commission).sum();
    let office_pct = if total_commission > 0.0 {
        round1(office_commission / total_commission * 100.0)
    } else {
        0.0
    };
    YearSummary {
        year,
        leases: rows.len(),
        total_revenue: round2(total_revenue),
        total_commission: round2(total_commission),
        office_commission: round2(office_commission),
        office_pct,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentYearSummary {
    pub year: i32,
    pub total_revenue: f64,
    pub agent_commission: f64,
}

/// Per-agent view of a year. The agent share is clamped at zero per row:
/// feeds report negative agent commissions on adjustments.
pub fn agent_year_summary(year: i32, rows: &[KpiRow], agent: Option<&str>) -> AgentYearSummary {
    let selected: Vec<&KpiRow> = match agent {
        Some(name) => rows
            .iter()
            .filter(|r| r.agent_name.trim() == name.trim())
            .collect(),
        None => rows.iter().collect(),
    };
    let total_revenue: f64 = selected.iter().map(|r| r.total_revenue).sum();
    let agent_commission: f64 = selected
        .iter()
        .map(|r| (r.total_commission - r.office_commission).max(0.0))
        .sum();
    AgentYearSummary {
        year,
        total_revenue: round2(total_revenue),
        agent_commission: round2(agent_commission),
    }
}

/// Distinct agent names across all rows, preferred subset first in its
/// configured order, the rest alphabetical.
pub fn ordered_agents<'a>(
    rows: impl IntoIterator<Item = &'a KpiRow>,
    preferred: &[String],
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        let name = row.agent_name.trim();
        if !name.is_empty() && !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| {
        let i = preferred.iter().position(|p| p == a);
        let j = preferred.iter().position(|p| p == b);
        match (i, j) {
            (Some(i), Some(j)) => i.cmp(&j),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    });
    names
}

/// Totals block for the KPI summary cards.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub gross_rent: f64,
    pub total_commission: f64,
    pub office_commission: f64,
    pub booking_fee: f64,
    pub total_revenue: f64,
}

pub fn totals(rows: &[KpiRow]) -> Totals {
    let mut acc = Totals {
        gross_rent: 0.0,
        total_commission: 0.0,
        office_commission: 0.0,
        booking_fee: 0.0,
        total_revenue: 0.0,
    };
    for row in rows {
        acc.gross_rent += row.gross_rent;
        acc.total_commission += row.total_commission;
        acc.office_commission += row.office_commission;
        acc.booking_fee += row.booking_fee;
        acc.total_revenue += row.total_revenue;
    }
    acc.gross_rent = round2(acc.gross_rent);
    acc.total_commission = round2(acc.total_commission);
    acc.office_commission = round2(acc.office_commission);
    acc.booking_fee = round2(acc.booking_fee);
    acc.total_revenue = round2(acc.total_revenue);
    acc
}

const SIGNED_MARKERS: &[&str] = &[
    "signed",
    "paid in full",
    "paid",
    "complete",
    "completed",
    "executed",
    "active",
    "closed",
];

const UNSIGNED_MARKERS: &[&str] = &["unsigned", "not signed", "draft", "pending signature"];

/// Substring heuristics over the raw status string. Applied at the
/// presentation layer only; the row keeps whatever the feed sent.
pub fn is_signed_status(status: &str) -> bool {
    let t = status.trim().to_ascii_lowercase();
    SIGNED_MARKERS.iter().any(|marker| t.contains(marker))
}

pub fn is_unsigned_status(status: &str) -> bool {
    let t = status.trim().to_ascii_lowercase();
    UNSIGNED_MARKERS.iter().any(|marker| t.contains(marker))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Signed,
    Unsigned,
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("signed") => Self::Signed,
            Some("unsigned") => Self::Unsigned,
            _ => Self::All,
        }
    }
}

/// "unsigned" means anything not clearly signed, so the two filters
/// partition the rows.
pub fn apply_status_filter(rows: Vec<KpiRow>, filter: StatusFilter) -> Vec<KpiRow> {
    match filter {
        StatusFilter::All => rows,
        StatusFilter::Signed => rows
            .into_iter()
            .filter(|r| is_signed_status(&r.status) && !is_unsigned_status(&r.status))
            .collect(),
        StatusFilter::Unsigned => rows
            .into_iter()
            .filter(|r| !is_signed_status(&r.status) || is_unsigned_status(&r.status))
            .collect(),
    }
}
