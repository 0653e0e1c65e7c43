//! Ordered-alias field resolution over untyped feed records.
//!
//! The upstream APIs disagree on key spelling (snake_case vs camelCase) and
//! nesting between deployments, so every logical field is resolved by probing
//! an explicit, priority-ordered candidate list. A miss is never an error:
//! the feed simply did not supply that field.

use serde_json::{Map, Value};

/// One record from an external feed. Lives for a single request.
pub type RawRecord = Map<String, Value>;

/// First candidate whose value is non-null and not an empty string.
/// Candidate order is significant and encodes dialect priority.
pub fn pick<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        match record.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) if text.is_empty() => continue,
            Some(value) => return Some(value),
        }
    }
    None
}

/// Scalar to display string; null and containers become empty.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Bool(flag) => if *flag { "true" } else { "false" }.to_string(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

/// String-or-number to f64, defaulting to 0.0 on absence or garbage.
pub fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// First whitespace-separated token of a full name. Deliberately lossy:
/// agents are shown by first name only.
pub fn first_name_only(full: &str) -> String {
    full.split_whitespace().next().unwrap_or("").to_string()
}

/// Person name out of a nested contact-like object: explicit first name wins,
/// else the first word of a display name.
fn name_from_object(obj: &RawRecord) -> Option<String> {
    if let Some(first) = pick(obj, &["first_name", "firstName"]) {
        let first = text(first);
        if !first.is_empty() {
            return Some(first);
        }
    }
    let display = pick(
        obj,
        &["name", "full_name", "fullName", "display_name", "displayName"],
    )?;
    match display {
        Value::String(name) if !name.trim().is_empty() => Some(first_name_only(name)),
        _ => None,
    }
}

const AGENT_ALIASES: &[&str] = &[
    "agent_name",
    "agentName",
    "listing_agent_name",
    "listingAgentName",
    "agent",
    "listing_agent",
    "listingAgent",
    "primary_agent",
    "primaryAgent",
    "agent_name_display",
    "agentNameDisplay",
    "assigned_agent",
    "assignedAgent",
    "assigned_to",
    "assignedTo",
    "contact_name",
    "contactName",
    "contact",
    "broker_name",
    "brokerName",
    "salesperson",
    "user_name",
    "userName",
    "user",
    "primary_contact",
    "primaryContact",
];

const AGENT_OBJECT_KEYS: &[&str] = &[
    "agent",
    "listing_agent",
    "listingAgent",
    "primary_agent",
    "primaryAgent",
    "assigned_agent",
    "assignedAgent",
    "contact",
    "user",
];

/// Agent first name across every dialect seen in the wild: direct string
/// aliases, nested person objects, then a last-resort scan of any key
/// mentioning agent/contact/broker/user.
pub fn agent_name(record: &RawRecord) -> String {
    match pick(record, AGENT_ALIASES) {
        Some(Value::String(direct)) if !direct.trim().is_empty() => {
            return first_name_only(direct);
        }
        Some(Value::Object(obj)) => {
            if let Some(name) = name_from_object(obj) {
                return name;
            }
        }
        _ => {}
    }

    for key in AGENT_OBJECT_KEYS {
        if let Some(Value::Object(obj)) = record.get(*key) {
            if let Some(name) = name_from_object(obj) {
                return name;
            }
        }
    }

    for (key, value) in record {
        let k = key.to_ascii_lowercase();
        let relevant = k.contains("agent")
            || k.contains("contact")
            || k.contains("broker")
            || k == "user"
            || k == "user_name"
            || k == "username";
        if !relevant || k.contains("id") || k.contains("email") {
            continue;
        }
        match value {
            Value::String(name) if !name.trim().is_empty() => return first_name_only(name),
            Value::Object(obj) => {
                if let Some(name) = name_from_object(obj) {
                    return name;
                }
            }
            _ => {}
        }
    }

    String::new()
}

const ADDRESS_ALIASES: &[&str] = &[
    "listing_address",
    "listingAddress",
    "street_address",
    "streetAddress",
    "property_street_address",
    "propertyStreetAddress",
    "address",
    "Address",
    "property_address",
    "propertyAddress",
    "street",
    "line1",
    "line_1",
    "address_line_1",
    "addressLine1",
];

const NESTED_ADDRESS_ALIASES: &[&str] = &[
    "listing_address",
    "listingAddress",
    "street_address",
    "streetAddress",
    "property_street_address",
    "propertyStreetAddress",
    "address",
    "Address",
    "street",
    "Street",
    "line1",
    "line_1",
];

/// Best-effort street address: direct aliases, then the nested
/// property/listing/unit object.
pub fn address(record: &RawRecord) -> String {
    if let Some(Value::String(direct)) = pick(record, ADDRESS_ALIASES) {
        if !direct.trim().is_empty() {
            return direct.trim().to_string();
        }
    }
    if let Some(Value::Object(obj)) = pick(record, &["property", "listing", "unit"]) {
        if let Some(Value::String(nested)) = pick(obj, NESTED_ADDRESS_ALIASES) {
            if !nested.trim().is_empty() {
                return nested.trim().to_string();
            }
        }
    }
    String::new()
}

/// Status exactly as the feed sent it, coerced to a string but never
/// canonicalized. Classification happens at the presentation layer only.
pub fn raw_status(record: &RawRecord) -> String {
    let value = pick(
        record,
        &[
            "status",
            "signed",
            "contract_status",
            "contractStatus",
            "lease_status",
            "leaseStatus",
        ],
    );
    match value {
        Some(v) => text(v),
        None => String::new(),
    }
}

const EMAIL_ALIASES: &[&str] = &[
    "tenant_email",
    "tenantEmail",
    "tenant_email1",
    "tenantEmail1",
    "contact_email",
    "contactEmail",
    "renter_email",
    "renterEmail",
    "guest_email",
    "guestEmail",
    "lessee_email",
    "lesseeEmail",
    "email",
    "primary_email",
    "primaryEmail",
    "email1",
];

/// Tenant/contact email, lower-cased for matching; nested contact objects
/// are probed when no direct alias hits.
pub fn tenant_email(record: &RawRecord) -> String {
    if let Some(Value::String(email)) = pick(record, EMAIL_ALIASES) {
        return email.trim().to_ascii_lowercase();
    }
    for key in ["tenant", "contact", "renter", "guest", "lessee"] {
        if let Some(Value::Object(contact)) = record.get(key) {
            if let Some(Value::String(email)) =
                pick(contact, &["email1", "email", "email_address", "primary_email"])
            {
                return email.trim().to_ascii_lowercase();
            }
        }
    }
    String::new()
}

const CONTRACT_DATE_ALIASES: &[&str] = &[
    "contract_date",
    "contractDate",
    "created_date",
    "createdDate",
    "contract_data",
    "contractData",
    "date",
    "signed_date",
    "signedDate",
    "start_date",
    "startDate",
    "lease_date",
    "leaseDate",
    "created_at",
    "createdAt",
    "created",
];

/// Contract/lease date clipped to `YYYY-MM-DD` for lexicographic comparison.
pub fn contract_date(record: &RawRecord) -> String {
    match pick(record, CONTRACT_DATE_ALIASES) {
        Some(Value::String(raw)) => date_prefix(raw),
        _ => String::new(),
    }
}

/// First ten characters of a trimmed timestamp, i.e. the ISO day.
pub fn date_prefix(raw: &str) -> String {
    raw.trim().chars().take(10).collect()
}

/// Lease identifier used for display and as a lease-detail URL segment.
pub fn lease_id(record: &RawRecord) -> String {
    match pick(record, &["lease_id", "leaseId", "lease_number", "leaseNumber", "id"]) {
        Some(value) => text(value),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn pick_returns_camel_case_alias_when_only_one_present() {
        let rec = record(json!({ "officeCommission": "150.5" }));
        let hit = pick(&rec, &["office_commission", "officeCommission"]);
        assert_eq!(hit, Some(&json!("150.5")));
    }

    #[test]
    fn pick_prefers_earlier_listed_alias() {
        let rec = record(json!({ "office_commission": 1, "officeCommission": 2 }));
        assert_eq!(
            pick(&rec, &["office_commission", "officeCommission"]),
            Some(&json!(1))
        );
        assert_eq!(
            pick(&rec, &["officeCommission", "office_commission"]),
            Some(&json!(2))
        );
    }

    #[test]
    fn pick_skips_null_and_empty_string() {
        let rec = record(json!({ "email": "", "primary_email": null, "email1": "a@x.com" }));
        assert_eq!(
            pick(&rec, &["email", "primary_email", "email1"]),
            Some(&json!("a@x.com"))
        );
        assert_eq!(pick(&rec, &["email", "primary_email"]), None);
    }

    #[test]
    fn number_coerces_strings_and_defaults_to_zero() {
        assert_eq!(number(Some(&json!("150.5"))), 150.5);
        assert_eq!(number(Some(&json!(42))), 42.0);
        assert_eq!(number(Some(&json!("n/a"))), 0.0);
        assert_eq!(number(None), 0.0);
    }

    #[test]
    fn agent_name_keeps_first_token_only() {
        let rec = record(json!({ "agent_name": "Jane Smith" }));
        assert_eq!(agent_name(&rec), "Jane");
    }

    #[test]
    fn agent_name_reads_nested_contact_object() {
        let rec = record(json!({ "agent": { "first_name": "Liam", "last_name": "K" } }));
        assert_eq!(agent_name(&rec), "Liam");

        let rec = record(json!({ "user": { "name": "Joyce Miller" } }));
        assert_eq!(agent_name(&rec), "Joyce");
    }

    #[test]
    fn agent_name_falls_back_to_key_scan_skipping_ids_and_emails() {
        let rec = record(json!({
            "agent_id": 7,
            "agent_email": "a@x.com",
            "listing_broker": "Suzi Q"
        }));
        assert_eq!(agent_name(&rec), "Suzi");
    }

    #[test]
    fn address_prefers_direct_alias_over_nested() {
        let rec = record(json!({
            "listing_address": "1 Main St",
            "property": { "address": "2 Side St" }
        }));
        assert_eq!(address(&rec), "1 Main St");

        let rec = record(json!({ "property": { "street_address": "2 Side St" } }));
        assert_eq!(address(&rec), "2 Side St");
    }

    #[test]
    fn raw_status_passes_through_without_canonicalizing() {
        assert_eq!(raw_status(&record(json!({ "status": " Paid in Full " }))), "Paid in Full");
        assert_eq!(raw_status(&record(json!({ "signed": true }))), "true");
        assert_eq!(raw_status(&record(json!({ "lease_status": 3 }))), "3");
        assert_eq!(raw_status(&record(json!({}))), "");
    }

    #[test]
    fn tenant_email_is_lowercased_and_probes_nested_contact() {
        let rec = record(json!({ "tenant_email": " A@X.com " }));
        assert_eq!(tenant_email(&rec), "a@x.com");

        let rec = record(json!({ "contact": { "email1": "B@Y.com" } }));
        assert_eq!(tenant_email(&rec), "b@y.com");
    }

    #[test]
    fn contract_date_clips_timestamps_to_iso_day() {
        let rec = record(json!({ "created_at": "2024-01-05T09:30:00Z" }));
        assert_eq!(contract_date(&rec), "2024-01-05");
    }
}
