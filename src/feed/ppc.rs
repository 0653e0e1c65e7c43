//! PPC lead/lease matching: marks rental inquiries as booked when a lease
//! for the same contact email exists on or after the inquiry date.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::resolve::{self, pick, text, RawRecord};

/// One matched-or-not inquiry row for the PPC report table.
#[derive(Debug, Clone, Serialize)]
pub struct PpcLeadRow {
    pub date: String,
    pub email: String,
    pub agent: String,
    #[serde(rename = "callRequested")]
    pub call_requested: bool,
    #[serde(rename = "leaseStatus")]
    pub lease_status: &'static str,
    pub revenue: f64,
    #[serde(rename = "leaseId", skip_serializing_if = "Option::is_none")]
    pub lease_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adults: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

pub const LEASE_STATUS_BOOKED: &str = "Booked";
pub const LEASE_STATUS_NONE: &str = "None";

/// A lease candidate for matching, in feed insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseMatch {
    pub contract_date: String,
    pub gross_rent: f64,
    pub lease_id: String,
}

/// Index lease-activity records by lower-cased tenant email. Records without
/// a resolvable email or contract date contribute nothing.
pub fn leases_by_email(leases: &[RawRecord]) -> HashMap<String, Vec<LeaseMatch>> {
    let mut index: HashMap<String, Vec<LeaseMatch>> = HashMap::new();
    for raw in leases {
        let email = resolve::tenant_email(raw);
        if email.is_empty() {
            continue;
        }
        let contract_date = resolve::contract_date(raw);
        if contract_date.is_empty() {
            continue;
        }
        index.entry(email).or_default().push(LeaseMatch {
            contract_date,
            gross_rent: resolve::number(pick(raw, &["gross_rent", "grossRent", "rent"])),
            lease_id: resolve::lease_id(raw),
        });
    }
    index
}

fn opportunity_email(raw: &RawRecord) -> String {
    let contact = raw.get("contact").and_then(Value::as_object);
    if let Some(contact) = contact {
        if let Some(email) = pick(contact, &["email1", "email"]) {
            let email = text(email);
            if !email.is_empty() {
                return email;
            }
        }
    }
    raw.get("email").map(text).unwrap_or_default()
}

fn opportunity_date(raw: &RawRecord) -> String {
    match pick(raw, &["created_at", "createdAt", "created"]) {
        Some(Value::String(s)) => resolve::date_prefix(s),
        Some(other) => resolve::date_prefix(&text(other)),
        None => String::new(),
    }
}

fn opportunity_agent(raw: &RawRecord, contact: Option<&RawRecord>) -> String {
    let user = raw
        .get("user")
        .and_then(Value::as_object)
        .or_else(|| contact.and_then(|c| c.get("user").and_then(Value::as_object)));

    let direct = user
        .and_then(|u| u.get("name"))
        .or_else(|| raw.get("agent_name"))
        .or_else(|| raw.get("agent"))
        .map(text)
        .unwrap_or_default();
    if !direct.is_empty() {
        return direct;
    }

    if let Some(user) = user {
        let first = pick(user, &["first_name", "firstName"]).map(text).unwrap_or_default();
        let last = pick(user, &["last_name", "lastName"]).map(text).unwrap_or_default();
        let joined = [first, last]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }
    }
    "—".to_string()
}

const CALL_INTENTS: &[&str] = &["book_call", "book-call", "book call", "call", "call_request"];

fn call_requested(raw: &RawRecord, contact: Option<&RawRecord>) -> bool {
    let intent = pick(raw, &["intent", "request_type", "form_type", "campaign"])
        .or_else(|| contact.and_then(|c| pick(c, &["intent", "request_type", "form_type"])))
        .map(text)
        .unwrap_or_default()
        .to_ascii_lowercase();
    CALL_INTENTS.contains(&intent.as_str())
}

/// Pass-through count fields that may be strings or numbers in the feed.
fn count_value(raw: &RawRecord, contact: Option<&RawRecord>, keys: &[&str], contact_keys: &[&str]) -> Option<Value> {
    pick(raw, keys)
        .or_else(|| contact.and_then(|c| pick(c, contact_keys)))
        .filter(|v| matches!(v, Value::String(_) | Value::Number(_)))
        .cloned()
}

fn opportunity_comment(raw: &RawRecord, contact: Option<&RawRecord>) -> Option<String> {
    let comment = pick(raw, &["comment", "comments", "message", "notes", "description"])
        .or_else(|| contact.and_then(|c| pick(c, &["comment", "comments", "message", "notes"])))
        .map(text)
        .unwrap_or_default();
    (!comment.is_empty()).then_some(comment)
}

/// Build the report rows for a date window.
///
/// Forward-looking existence match: the first lease (feed order) for the
/// same email with `contract_date >= inquiry date` marks the inquiry Booked,
/// however much later it occurred. Known to overcount conversions for repeat
/// households; matching has no deal identifier to anchor on.
pub fn build_rows(
    opportunities: &[RawRecord],
    leases: &HashMap<String, Vec<LeaseMatch>>,
    from: &str,
    to: &str,
) -> Vec<PpcLeadRow> {
    let mut rows = Vec::new();

    for raw in opportunities {
        let email = opportunity_email(raw);
        if email.is_empty() {
            continue;
        }
        let contact = raw.get("contact").and_then(Value::as_object);

        let date = opportunity_date(raw);
        if !date.is_empty() && (date.as_str() < from || date.as_str() > to) {
            continue;
        }

        let email_lower = email.to_ascii_lowercase();
        // Undated inquiries match against any lease ever recorded.
        let inquiry_date = if date.is_empty() { "1970-01-01" } else { date.as_str() };
        let matched = leases
            .get(&email_lower)
            .and_then(|candidates| {
                candidates
                    .iter()
                    .find(|lease| lease.contract_date.as_str() >= inquiry_date)
            });

        rows.push(PpcLeadRow {
            agent: opportunity_agent(raw, contact),
            call_requested: call_requested(raw, contact),
            lease_status: if matched.is_some() {
                LEASE_STATUS_BOOKED
            } else {
                LEASE_STATUS_NONE
            },
            revenue: matched.map(|lease| lease.gross_rent).unwrap_or(0.0),
            lease_id: matched
                .map(|lease| lease.lease_id.clone())
                .filter(|id| !id.is_empty()),
            adults: count_value(
                raw,
                contact,
                &["adults", "guest", "guests", "number_of_guests"],
                &["adults", "guest", "guests"],
            ),
            children: count_value(
                raw,
                contact,
                &["children", "kids", "number_of_children"],
                &["children", "kids"],
            ),
            comment: opportunity_comment(raw, contact),
            date,
            email,
        });
    }

    // Lexicographic descending is chronological descending for zero-padded
    // ISO dates.
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    fn lease(email: &str, date: &str, rent: f64, id: &str) -> RawRecord {
        record(json!({
            "tenant_email": email,
            "contract_date": date,
            "gross_rent": rent,
            "lease_id": id,
        }))
    }

    fn inquiry(email: &str, created_at: &str) -> RawRecord {
        record(json!({ "contact": { "email1": email }, "created_at": created_at }))
    }

    #[test]
    fn later_lease_marks_inquiry_booked_with_its_revenue() {
        let leases = leases_by_email(&[lease("a@x.com", "2024-01-10", 2000.0, "L-1")]);
        let rows = build_rows(
            &[inquiry("a@x.com", "2024-01-05")],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lease_status, LEASE_STATUS_BOOKED);
        assert_eq!(rows[0].revenue, 2000.0);
        assert_eq!(rows[0].lease_id.as_deref(), Some("L-1"));
    }

    #[test]
    fn earlier_lease_never_matches_backward() {
        let leases = leases_by_email(&[lease("a@x.com", "2024-01-10", 2000.0, "L-1")]);
        let rows = build_rows(
            &[inquiry("a@x.com", "2024-06-01")],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows[0].lease_status, LEASE_STATUS_NONE);
        assert_eq!(rows[0].revenue, 0.0);
        assert!(rows[0].lease_id.is_none());
    }

    #[test]
    fn first_lease_in_feed_order_wins_not_nearest() {
        let leases = leases_by_email(&[
            lease("a@x.com", "2024-09-01", 5000.0, "L-late"),
            lease("a@x.com", "2024-01-06", 1500.0, "L-near"),
        ]);
        let rows = build_rows(
            &[inquiry("a@x.com", "2024-01-05")],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows[0].lease_id.as_deref(), Some("L-late"));
        assert_eq!(rows[0].revenue, 5000.0);
    }

    #[test]
    fn inquiries_without_email_or_outside_window_are_skipped() {
        let leases = HashMap::new();
        let rows = build_rows(
            &[
                record(json!({ "created_at": "2024-01-05" })),
                inquiry("late@x.com", "2025-03-01"),
                inquiry("ok@x.com", "2024-02-01"),
            ],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ok@x.com");
    }

    #[test]
    fn rows_sort_descending_by_date() {
        let leases = HashMap::new();
        let rows = build_rows(
            &[
                inquiry("a@x.com", "2024-01-05"),
                inquiry("b@x.com", "2024-03-01"),
                inquiry("c@x.com", "2024-02-10"),
            ],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-10", "2024-01-05"]);
    }

    #[test]
    fn agent_falls_back_through_user_object_to_dash() {
        let raw = record(json!({
            "contact": { "email1": "a@x.com" },
            "created_at": "2024-01-05",
            "user": { "first_name": "Joyce", "last_name": "M" },
        }));
        let rows = build_rows(&[raw], &HashMap::new(), "2024-01-01", "2024-12-31");
        assert_eq!(rows[0].agent, "Joyce M");

        let rows = build_rows(
            &[inquiry("a@x.com", "2024-01-05")],
            &HashMap::new(),
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows[0].agent, "—");
    }

    #[test]
    fn call_intent_heuristic_matches_known_spellings() {
        for intent in ["book_call", "book-call", "book call", "call", "call_request"] {
            let raw = record(json!({
                "contact": { "email1": "a@x.com" },
                "created_at": "2024-01-05",
                "intent": intent,
            }));
            let rows = build_rows(&[raw], &HashMap::new(), "2024-01-01", "2024-12-31");
            assert!(rows[0].call_requested, "intent {intent} should count");
        }
        let raw = record(json!({
            "contact": { "email1": "a@x.com" },
            "created_at": "2024-01-05",
            "intent": "brochure",
        }));
        let rows = build_rows(&[raw], &HashMap::new(), "2024-01-01", "2024-12-31");
        assert!(!rows[0].call_requested);
    }

    #[test]
    fn emails_match_case_insensitively() {
        let leases = leases_by_email(&[lease("A@X.com", "2024-01-10", 900.0, "L-1")]);
        let rows = build_rows(
            &[inquiry("a@X.COM", "2024-01-05")],
            &leases,
            "2024-01-01",
            "2024-12-31",
        );
        assert_eq!(rows[0].lease_status, LEASE_STATUS_BOOKED);
    }
}
