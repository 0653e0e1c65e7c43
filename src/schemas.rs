use serde::Deserialize;
use validator::Validate;

use crate::error::FeedError;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), FeedError> {
    input
        .validate()
        .map_err(|errors| FeedError::config(format!("Validation failed: {errors}")))
}

/// Query for the rentals KPI table. The legacy admin pages send
/// `created_date_gte`/`created_date_lte`; `from_date`/`to_date` are accepted
/// as aliases.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KpiQuery {
    pub created_date_gte: Option<String>,
    pub created_date_lte: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub status: Option<String>,
    pub debug: Option<String>,
    pub debug_lease_id: Option<String>,
}

impl KpiQuery {
    pub fn from(&self) -> Option<&str> {
        self.created_date_gte.as_deref().or(self.from_date.as_deref())
    }

    pub fn to(&self) -> Option<&str> {
        self.created_date_lte.as_deref().or(self.to_date.as_deref())
    }

    pub fn debug_enabled(&self) -> bool {
        matches!(self.debug.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PpcQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub debug: Option<String>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusQuery {
    pub debug: Option<String>,
}

impl StatusQuery {
    pub fn debug_enabled(&self) -> bool {
        matches!(self.debug.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChartsQuery {
    pub agent: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct KpiSummaryQuery {
    pub preset: Option<String>,
    pub comparison: Option<String>,
    pub status: Option<String>,
}

/// Lead form body forwarded to the CRM. Only the email is mandatory; the
/// handler fills display defaults for the rest.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GetInTouchInput {
    #[validate(email)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub comment: Option<String>,
    pub arrival_date: Option<String>,
    pub departure_date: Option<String>,
    pub guest: Option<i64>,
    pub children: Option<i64>,
    pub contact_method: Option<String>,
    pub source: Option<String>,
}
