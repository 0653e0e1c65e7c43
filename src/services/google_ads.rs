//! Google Ads spend reporting: refresh-token OAuth exchange plus one GAQL
//! search per requested window.

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::FeedError;

const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const ADS_API_VERSION: &str = "v19";

#[derive(Debug, Clone)]
pub struct AdsCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: String,
    pub refresh_token: String,
    pub customer_id: String,
    pub login_customer_id: Option<String>,
}

/// Gather the five required credentials, naming every missing variable so
/// the 503 body says exactly what to set.
pub fn credentials(config: &AppConfig) -> Result<AdsCredentials, FeedError> {
    let mut missing: Vec<&str> = Vec::new();
    let mut need = |value: &Option<String>, name: &'static str| -> String {
        match value {
            Some(v) => v.clone(),
            None => {
                missing.push(name);
                String::new()
            }
        }
    };

    let creds = AdsCredentials {
        client_id: need(&config.google_ads_client_id, "GOOGLE_ADS_CLIENT_ID"),
        client_secret: need(&config.google_ads_client_secret, "GOOGLE_ADS_CLIENT_SECRET"),
        developer_token: need(&config.google_ads_developer_token, "GOOGLE_ADS_DEVELOPER_TOKEN"),
        refresh_token: need(&config.google_ads_refresh_token, "GOOGLE_ADS_REFRESH_TOKEN"),
        customer_id: need(&config.google_ads_customer_id, "GOOGLE_ADS_CUSTOMER_ID"),
        login_customer_id: config.google_ads_login_customer_id.clone(),
    };

    if missing.is_empty() {
        Ok(creds)
    } else {
        Err(FeedError::config(format!(
            "Google Ads is not configured. Missing: {}",
            missing.join(", ")
        )))
    }
}

async fn fetch_access_token(
    http: &reqwest::Client,
    creds: &AdsCredentials,
) -> Result<String, FeedError> {
    let response = http
        .post(OAUTH_TOKEN_URL)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ])
        .send()
        .await
        .map_err(|err| FeedError::transport("Google OAuth", err))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| FeedError::transport("Google OAuth", err))?;
    if !status.is_success() {
        return Err(FeedError::upstream("Google OAuth", status.as_u16(), body));
    }

    let payload: Value =
        serde_json::from_str(&body).map_err(|err| FeedError::transport("Google OAuth", err))?;
    payload
        .get("access_token")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| FeedError::transport("Google OAuth", "token response without access_token"))
}

fn micros(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn cost_micros(metrics: Option<&Value>) -> Option<f64> {
    let metrics = metrics?;
    micros(metrics.get("costMicros")).or_else(|| micros(metrics.get("cost_micros")))
}

/// Total campaign spend for [from, to], in account currency units rounded to
/// cents. Prefers the API's summary row; sums result rows when absent.
pub async fn fetch_total_spend(
    http: &reqwest::Client,
    creds: &AdsCredentials,
    from: &str,
    to: &str,
) -> Result<f64, FeedError> {
    let access_token = fetch_access_token(http, creds).await?;

    let customer_id = creds.customer_id.replace('-', "");
    let url = format!(
        "https://googleads.googleapis.com/{ADS_API_VERSION}/customers/{customer_id}/googleAds:search"
    );
    let query = format!(
        "SELECT metrics.cost_micros FROM campaign WHERE segments.date BETWEEN '{from}' AND '{to}'"
    );

    let mut request = http
        .post(&url)
        .bearer_auth(&access_token)
        .header("developer-token", creds.developer_token.clone())
        .json(&json!({
            "query": query,
            "searchSettings": { "returnSummaryRow": true },
        }));
    if let Some(login) = &creds.login_customer_id {
        request = request.header("login-customer-id", login.replace('-', ""));
    }

    let response = request
        .send()
        .await
        .map_err(|err| FeedError::transport("Google Ads", err))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| FeedError::transport("Google Ads", err))?;
    if !status.is_success() {
        let body = if status.as_u16() == 403 && body.contains("USER_PERMISSION_DENIED") {
            format!("{body} (hint: set GOOGLE_ADS_LOGIN_CUSTOMER_ID to the manager account id)")
        } else {
            body
        };
        return Err(FeedError::upstream("Google Ads", status.as_u16(), body));
    }

    let payload: Value =
        serde_json::from_str(&body).map_err(|err| FeedError::transport("Google Ads", err))?;

    let total_micros = payload
        .get("summaryRow")
        .and_then(|row| cost_micros(row.get("metrics")))
        .unwrap_or_else(|| {
            payload
                .get("results")
                .and_then(Value::as_array)
                .map(|rows| {
                    rows.iter()
                        .filter_map(|row| cost_micros(row.get("metrics")))
                        .sum()
                })
                .unwrap_or(0.0)
        });

    Ok((total_micros / 1_000_000.0 * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_row_wins_over_result_rows() {
        let payload = json!({
            "summaryRow": { "metrics": { "costMicros": "2500000" } },
            "results": [{ "metrics": { "costMicros": "1000000" } }],
        });
        let total = payload
            .get("summaryRow")
            .and_then(|row| cost_micros(row.get("metrics")))
            .unwrap();
        assert_eq!(total, 2_500_000.0);
    }

    #[test]
    fn result_rows_sum_when_summary_absent() {
        let payload = json!({
            "results": [
                { "metrics": { "costMicros": 1_000_000 } },
                { "metrics": { "cost_micros": "500000" } },
                { "metrics": {} },
            ],
        });
        let total: f64 = payload
            .get("results")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(|row| cost_micros(row.get("metrics")))
            .sum();
        assert_eq!(total, 1_500_000.0);
    }

    #[test]
    fn missing_credentials_name_every_variable() {
        let config = AppConfig {
            google_ads_client_id: Some("id".to_string()),
            ..AppConfig::default()
        };
        let err = credentials(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GOOGLE_ADS_CLIENT_SECRET"));
        assert!(message.contains("GOOGLE_ADS_REFRESH_TOKEN"));
        assert!(!message.contains("GOOGLE_ADS_CLIENT_ID,"));
    }
}
