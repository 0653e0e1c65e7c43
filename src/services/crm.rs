//! Lead forwarding to the CRM's get-in-touch endpoint.

use serde_json::Value;

use crate::error::FeedError;

pub async fn forward_lead(
    http: &reqwest::Client,
    url: &str,
    payload: &Value,
) -> Result<(), FeedError> {
    let response = http
        .post(url)
        .header("Accept", "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|err| FeedError::transport("CRM get-in-touch", err))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(FeedError::upstream(
        "CRM get-in-touch",
        status.as_u16(),
        body,
    ))
}
