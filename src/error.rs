use axum::http::StatusCode;

/// Failure taxonomy for upstream feeds. Absent or malformed fields inside a
/// record are never errors; these cover the request itself.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Required environment configuration is missing. Maps to 503.
    #[error("{0}")]
    Config(String),
    /// Upstream answered non-2xx. Maps to 502; body kept truncated for
    /// diagnosis.
    #[error("{context} returned {status}: {body}")]
    Upstream {
        context: &'static str,
        status: u16,
        body: String,
    },
    /// Network failure or an undecodable body. Maps to 502.
    #[error("{context}: {message}")]
    Transport {
        context: &'static str,
        message: String,
    },
}

impl FeedError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn upstream(context: &'static str, status: u16, body: String) -> Self {
        Self::Upstream {
            context,
            status,
            body: truncate(&body, 200),
        }
    }

    pub fn transport(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            context,
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { .. } | Self::Transport { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// 401 from the opportunity feed almost always means the JWT is missing.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Upstream { status: 401, .. })
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_body_is_truncated() {
        let err = FeedError::upstream("feed", 500, "x".repeat(500));
        match err {
            FeedError::Upstream { body, .. } => assert_eq!(body.len(), 200),
            _ => unreachable!(),
        }
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            FeedError::config("PMS_API_URL not set").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            FeedError::transport("feed", "connection refused").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
