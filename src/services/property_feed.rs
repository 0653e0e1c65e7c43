//! Client for the property-management backend: lease activity, the Rentals
//! United listings feed, and the rental-opportunity feed.

use serde_json::Value;

use crate::config::AppConfig;
use crate::error::FeedError;
use crate::feed::normalize;
use crate::feed::paginate;
use crate::feed::resolve::RawRecord;

/// Hard page caps so a broken next-link chain cannot loop forever.
const LISTINGS_PAGE_CAP: usize = 50;
pub const OPPORTUNITY_PAGE_CAP: usize = 10;
const OPPORTUNITY_PAGE_SIZE: usize = 500;
const LEASE_ACTIVITY_LIMIT: usize = 2000;

pub fn pms_base(config: &AppConfig) -> Result<&str, FeedError> {
    config
        .pms_api_url
        .as_deref()
        .ok_or_else(|| FeedError::config("PMS_API_URL is not set"))
}

/// JWT wins over the API key when both are configured.
fn apply_auth(request: reqwest::RequestBuilder, config: &AppConfig) -> reqwest::RequestBuilder {
    let request = request.header("Accept", "application/json");
    if let Some(jwt) = &config.pms_jwt {
        request.header("Authorization", format!("JWT {jwt}"))
    } else if let Some(key) = &config.pms_api_key {
        request.header("x-api-key", key.clone())
    } else {
        request
    }
}

async fn fetch_envelope(
    http: &reqwest::Client,
    config: &AppConfig,
    url: &str,
    query: &[(&str, &str)],
    context: &'static str,
) -> Result<Value, FeedError> {
    let mut request = http.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }
    let response = apply_auth(request, config)
        .send()
        .await
        .map_err(|err| FeedError::transport(context, err))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| FeedError::transport(context, err))?;
    if !status.is_success() {
        return Err(FeedError::upstream(context, status.as_u16(), body));
    }
    serde_json::from_str(&body).map_err(|err| FeedError::transport(context, err))
}

/// One window of the lease-activity feed, normalized to raw records. The
/// upstream paginates, but a 2000-row limit covers every realistic window.
pub async fn fetch_lease_activity(
    http: &reqwest::Client,
    config: &AppConfig,
    created_date_gte: &str,
    created_date_lte: &str,
    status: Option<&str>,
) -> Result<Vec<RawRecord>, FeedError> {
    let base = pms_base(config)?;
    let url = format!("{base}/lease-activity");
    let limit = LEASE_ACTIVITY_LIMIT.to_string();

    let mut query = vec![
        ("created_date_gte", created_date_gte),
        ("created_date_lte", created_date_lte),
        ("limit", limit.as_str()),
    ];
    if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
        query.push(("status", status));
    }

    let envelope = fetch_envelope(http, config, &url, &query, "lease-activity").await?;
    Ok(normalize::records(&envelope))
}

/// Listings feed accumulated across pages.
pub struct PaginatedFeed {
    pub records: Vec<RawRecord>,
    pub reported_total: Option<u64>,
    pub pages_fetched: usize,
    /// First page kept verbatim for the debug view.
    pub first_envelope: Value,
}

/// Walk the Rentals United listings feed: follow next links when the
/// envelope carries them, otherwise synthesize `page=N&per_page=size` while
/// the reported total says there is more.
pub async fn fetch_listings(
    http: &reqwest::Client,
    config: &AppConfig,
) -> Result<PaginatedFeed, FeedError> {
    let base = pms_base(config)?;
    let first_url = format!("{base}/listings-rentals-united");

    let mut url = first_url.clone();
    let mut records: Vec<RawRecord> = Vec::new();
    let mut reported_total: Option<u64> = None;
    let mut page_size = 0usize;
    let mut pages_fetched = 0usize;
    let mut first_envelope = Value::Null;

    loop {
        let envelope = fetch_envelope(http, config, &url, &[], "listings-rentals-united").await?;
        let page = normalize::records(&envelope);
        pages_fetched += 1;

        if pages_fetched == 1 {
            reported_total = envelope.as_object().and_then(normalize::reported_count);
            page_size = page.len();
            first_envelope = envelope.clone();
        }

        let page_len = page.len();
        records.extend(page);

        if page_len == 0 || pages_fetched >= LISTINGS_PAGE_CAP {
            break;
        }

        if let Some(next) = envelope
            .as_object()
            .and_then(|env| paginate::next_page_url(env, base))
        {
            url = next;
            continue;
        }

        match reported_total {
            Some(total) if (records.len() as u64) < total && page_size > 0 => {
                url = paginate::synthesized_page_url(&first_url, records.len(), page_size);
            }
            _ => break,
        }
    }

    Ok(PaginatedFeed {
        records,
        reported_total,
        pages_fetched,
        first_envelope,
    })
}

/// Opportunity feed pages accumulated in feed order.
pub struct OpportunityFeed {
    pub records: Vec<RawRecord>,
    pub first_envelope: Value,
    pub pages_fetched: usize,
}

/// Walk the rental-opportunity feed newest-first. Only the envelope's own
/// `next` link is followed; a short page means the feed is exhausted.
pub async fn fetch_opportunities(
    http: &reqwest::Client,
    config: &AppConfig,
    max_pages: usize,
) -> Result<OpportunityFeed, FeedError> {
    let base = pms_base(config)?;
    let mut url = format!(
        "{base}/rental-opportunity?limit={OPPORTUNITY_PAGE_SIZE}&ordering=-created_at"
    );

    let mut records: Vec<RawRecord> = Vec::new();
    let mut first_envelope = Value::Null;
    let mut pages_fetched = 0usize;

    while pages_fetched < max_pages {
        let envelope = fetch_envelope(http, config, &url, &[], "rental-opportunity").await?;
        let page = normalize::records(&envelope);
        pages_fetched += 1;

        if pages_fetched == 1 {
            first_envelope = envelope.clone();
        }

        let page_len = page.len();
        records.extend(page);

        if page_len < OPPORTUNITY_PAGE_SIZE {
            break;
        }
        match envelope
            .as_object()
            .and_then(|env| paginate::next_page_url(env, base))
        {
            Some(next) => url = next,
            None => break,
        }
    }

    Ok(OpportunityFeed {
        records,
        first_envelope,
        pages_fetched,
    })
}

/// Secondary KPI upstream, proxied verbatim when the primary feed fails.
pub async fn fetch_booking_kpi(
    http: &reqwest::Client,
    config: &AppConfig,
    from_date: &str,
    to_date: &str,
) -> Result<Value, FeedError> {
    let base = config
        .booking_api_url
        .as_deref()
        .ok_or_else(|| FeedError::config("BOOKING_API_URL is not set"))?;
    let url = format!("{base}/api/booking/rentals-kpi/");
    fetch_envelope(
        http,
        config,
        &url,
        &[("from_date", from_date), ("to_date", to_date)],
        "booking rentals-kpi",
    )
    .await
}
