//! Date-range arithmetic for the report presets. Every function takes
//! `today` explicitly so handlers pass the clock and tests pass a fixture.

use chrono::{Datelike, NaiveDate};

pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start"))
}

/// Previous month of a (year, month) pair, rolling over year boundaries.
fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn shift_months(date: NaiveDate, months_back: u32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months_back {
        (year, month) = previous_month(year, month);
    }
    clamped_date(year, month, date.day())
}

/// Year-to-date window for a given year: Jan 1 through today's month/day,
/// with the day clamped to that year's month length (leap days).
pub fn ytd_range(year: i32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists");
    let end = clamped_date(year, today.month(), today.day());
    (start, end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    ThisMonth,
    LastMonth,
    ThisYear,
}

impl DatePreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "this_month" => Some(Self::ThisMonth),
            "last_month" => Some(Self::LastMonth),
            "this_year" => Some(Self::ThisYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonPreset {
    SamePeriodLastYear,
    SamePeriodLastMonth,
    LastMonth,
    LastYear,
}

impl ComparisonPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "same_period_last_year" => Some(Self::SamePeriodLastYear),
            "same_period_last_month" => Some(Self::SamePeriodLastMonth),
            "last_month" => Some(Self::LastMonth),
            "last_year" => Some(Self::LastYear),
            _ => None,
        }
    }
}

/// Preset window, optionally shifted whole years back (for same-period
/// comparisons). With a shift, the open end is clamped to the equivalent
/// day instead of running to `today`.
pub fn preset_range(preset: DatePreset, today: NaiveDate, year_offset: i32) -> (NaiveDate, NaiveDate) {
    let year = today.year() + year_offset;
    match preset {
        DatePreset::ThisMonth => {
            let start = clamped_date(year, today.month(), 1);
            let end = if year_offset == 0 {
                today
            } else {
                clamped_date(year, today.month(), today.day())
            };
            (start, end)
        }
        DatePreset::LastMonth => {
            let (start_year, start_month) = previous_month(year, today.month());
            let start = clamped_date(start_year, start_month, 1);
            // Last day of the previous month relative to the real clock; the
            // shifted window clamps to the same day-of-month.
            let (cur_year, cur_month) = previous_month(today.year(), today.month());
            let current_end_day = days_in_month(cur_year, cur_month);
            let end = if year_offset == 0 {
                clamped_date(cur_year, cur_month, current_end_day)
            } else {
                clamped_date(start_year, start_month, current_end_day)
            };
            (start, end)
        }
        DatePreset::ThisYear => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists");
            let end = if year_offset == 0 {
                today
            } else {
                clamped_date(year, today.month(), today.day())
            };
            (start, end)
        }
    }
}

/// Comparison window for a given primary preset.
pub fn comparison_range(
    preset: DatePreset,
    comparison: ComparisonPreset,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    match comparison {
        ComparisonPreset::SamePeriodLastYear => preset_range(preset, today, -1),
        ComparisonPreset::SamePeriodLastMonth => {
            let (start, end) = preset_range(preset, today, 0);
            (shift_months(start, 1), shift_months(end, 1))
        }
        ComparisonPreset::LastMonth => {
            let (year, month) = previous_month(today.year(), today.month());
            let start = clamped_date(year, month, 1);
            let end = clamped_date(year, month, days_in_month(year, month));
            (start, end)
        }
        ComparisonPreset::LastYear => {
            let year = today.year() - 1;
            (
                NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists"),
                NaiveDate::from_ymd_opt(year, 12, 31).expect("Dec 31 exists"),
            )
        }
    }
}
