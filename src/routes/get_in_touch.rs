use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    error::FeedError,
    schemas::{validate_input, GetInTouchInput},
    services::crm,
    state::AppState,
};

fn normalized_contact_method(raw: Option<&str>) -> &'static str {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("phone") => "phone",
        Some("text") => "text",
        _ => "email",
    }
}

fn name_or_dash(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("—")
        .to_string()
}

/// Validate the public lead form and forward it to the CRM.
pub async fn get_in_touch(
    State(state): State<AppState>,
    Json(input): Json<GetInTouchInput>,
) -> impl IntoResponse {
    if input.email.trim().is_empty() || validate_input(&input).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "A valid email is required." })),
        );
    }

    let Some(url) = state.config.crm_get_in_touch_url.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "CRM_GET_IN_TOUCH_URL is not set" })),
        );
    };

    let payload = json!({
        "email": input.email.trim(),
        "first_name": name_or_dash(input.first_name.as_deref()),
        "last_name": name_or_dash(input.last_name.as_deref()),
        "phone": input.phone.as_deref().unwrap_or(""),
        "comment": input.comment.as_deref().unwrap_or(""),
        "arrival_date": input.arrival_date,
        "departure_date": input.departure_date,
        "guest": input.guest,
        "children": input.children,
        "contact_method": normalized_contact_method(input.contact_method.as_deref()),
        "source": input
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&state.config.lead_source),
    });

    match crm::forward_lead(&state.http, url, &payload).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(FeedError::Upstream { status, body, .. }) => {
            tracing::warn!(status, "CRM rejected the lead");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Lead submission failed", "details": body })),
            )
        }
        Err(err) => (
            err.status_code(),
            Json(json!({ "error": "Lead submission failed", "details": err.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_method_normalizes_to_known_channels() {
        assert_eq!(normalized_contact_method(Some("Phone")), "phone");
        assert_eq!(normalized_contact_method(Some(" TEXT ")), "text");
        assert_eq!(normalized_contact_method(Some("whatsapp")), "email");
        assert_eq!(normalized_contact_method(None), "email");
    }

    #[test]
    fn missing_names_render_as_dash() {
        assert_eq!(name_or_dash(None), "—");
        assert_eq!(name_or_dash(Some("  ")), "—");
        assert_eq!(name_or_dash(Some(" Ann ")), "Ann");
    }
}
