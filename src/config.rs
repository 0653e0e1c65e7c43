use std::env;

/// Process configuration, read once at startup and shared through `AppState`.
/// Upstream credentials are optional: endpoints that need a missing one
/// answer 503 instead of failing at boot.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub app_name: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    /// Property-management backend (lease-activity, listings, opportunities).
    pub pms_api_url: Option<String>,
    pub pms_api_key: Option<String>,
    /// JWT takes precedence over the API key when both are set.
    pub pms_jwt: Option<String>,
    /// Secondary KPI upstream used when the PMS feed is unreachable.
    pub booking_api_url: Option<String>,

    pub crm_get_in_touch_url: Option<String>,
    pub lead_source: String,

    pub google_ads_client_id: Option<String>,
    pub google_ads_client_secret: Option<String>,
    pub google_ads_developer_token: Option<String>,
    pub google_ads_refresh_token: Option<String>,
    pub google_ads_customer_id: Option<String>,
    pub google_ads_login_customer_id: Option<String>,

    /// Agent names pinned to the front of chart dropdowns, in order.
    pub preferred_agent_order: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            app_name: env_or("APP_NAME", "Rentals Admin API"),
            environment: env_or("ENVIRONMENT", "development"),
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse_or("PORT", 8000),
            cors_origins: parse_csv(&env_or("CORS_ORIGINS", "http://localhost:3000")),
            pms_api_url: env_opt("PMS_API_URL").map(|url| trim_base_url(&url)),
            pms_api_key: env_opt("PMS_API_KEY"),
            pms_jwt: env_opt("PMS_JWT"),
            booking_api_url: env_opt("BOOKING_API_URL").map(|url| trim_base_url(&url)),
            crm_get_in_touch_url: env_opt("CRM_GET_IN_TOUCH_URL"),
            lead_source: env_or("LEAD_SOURCE", "website"),
            google_ads_client_id: env_opt("GOOGLE_ADS_CLIENT_ID"),
            google_ads_client_secret: env_opt("GOOGLE_ADS_CLIENT_SECRET"),
            google_ads_developer_token: env_opt("GOOGLE_ADS_DEVELOPER_TOKEN"),
            google_ads_refresh_token: env_opt("GOOGLE_ADS_REFRESH_TOKEN"),
            google_ads_customer_id: env_opt("GOOGLE_ADS_CUSTOMER_ID"),
            google_ads_login_customer_id: env_opt("GOOGLE_ADS_LOGIN_CUSTOMER_ID"),
            preferred_agent_order: parse_csv(&env_or(
                "PREFERRED_AGENT_ORDER",
                "Liam,Joyce,Suzi,Ann",
            )),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn trim_base_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::{parse_csv, trim_base_url};

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(
            trim_base_url("https://api.example.com/"),
            "https://api.example.com"
        );
        assert_eq!(
            trim_base_url("https://api.example.com//"),
            "https://api.example.com"
        );
        assert_eq!(
            trim_base_url("https://api.example.com"),
            "https://api.example.com"
        );
    }

    #[test]
    fn parses_csv_lists() {
        assert_eq!(parse_csv("Liam, Joyce ,,Suzi"), vec!["Liam", "Joyce", "Suzi"]);
        assert!(parse_csv(" ").is_empty());
    }
}
