//! Next-page discovery for paginated feed envelopes.

use serde_json::{Map, Value};

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn absolutize(next: &str, base_url: &str) -> String {
    if url::Url::parse(next).is_ok() {
        return next.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if next.starts_with('/') {
        format!("{base}{next}")
    } else {
        format!("{base}/{next}")
    }
}

/// Next-page URL from `next`/`next_page`/`nextPage`, or nested under
/// `links`/`pagination`. Relative links are resolved against the feed base.
pub fn next_page_url(envelope: &Map<String, Value>, base_url: &str) -> Option<String> {
    let direct = non_empty_str(envelope.get("next"))
        .or_else(|| non_empty_str(envelope.get("next_page")))
        .or_else(|| non_empty_str(envelope.get("nextPage")));
    if let Some(next) = direct {
        return Some(absolutize(next, base_url));
    }

    let links = envelope
        .get("links")
        .or_else(|| envelope.get("pagination"))
        .and_then(Value::as_object)?;
    let next = non_empty_str(links.get("next")).or_else(|| non_empty_str(links.get("next_page")))?;
    Some(absolutize(next, base_url))
}

/// `page=N&per_page=size` fallback when the envelope reports a total but no
/// next link. The page number is derived from how many records are already
/// accumulated.
pub fn synthesized_page_url(base_listings_url: &str, accumulated: usize, page_size: usize) -> String {
    let separator = if base_listings_url.contains('?') { '&' } else { '?' };
    let page = accumulated / page_size.max(1) + 1;
    format!("{base_listings_url}{separator}page={page}&per_page={page_size}")
}
