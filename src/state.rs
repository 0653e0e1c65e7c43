use std::sync::Arc;

use crate::config::AppConfig;

/// Shared, read-only request context. Cheap to clone; no mutable state
/// survives a request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn build(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(format!("rentals-admin-rs/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}
