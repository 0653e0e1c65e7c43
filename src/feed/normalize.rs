//! Record-list discovery inside arbitrarily-shaped response envelopes.
//!
//! The listings upstream has changed its envelope between deployments
//! (bare array, `{results}`, `{data}`, nested pagination wrappers), so the
//! normalizer degrades gracefully instead of hard-failing on shape drift.

use serde_json::{Map, Value};

use super::resolve::RawRecord;

/// Envelope keys tried in priority order before falling back to a deep scan.
const ENVELOPE_KEYS: &[&str] = &["results", "data", "listings", "items", "list", "records"];

/// Fraction of the API-reported total a candidate list must reach to be
/// trusted; rejects obviously-truncated or unrelated nested arrays.
const COUNT_TOLERANCE: f64 = 0.9;

/// Array or object-of-objects to a record list; non-object elements become
/// empty records rather than errors.
pub fn to_record_list(value: &Value) -> Vec<RawRecord> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().cloned().unwrap_or_default())
            .collect(),
        Value::Object(obj) if !obj.is_empty() => obj
            .values()
            .map(|item| item.as_object().cloned().unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

/// The `count`/`total` hint, when the envelope reports one as a number.
pub fn reported_count(envelope: &Map<String, Value>) -> Option<u64> {
    envelope
        .get("count")
        .or_else(|| envelope.get("total"))
        .and_then(Value::as_u64)
}

fn meets_count(len: usize, target: u64) -> bool {
    target == 0 || (len as f64) >= (target as f64) * COUNT_TOLERANCE
}

/// Flatten an unknown-shape response into its record list.
///
/// Order: bare array; well-known envelope keys validated against the count
/// hint; deep scan for the most plausible list; finally the top-level
/// object's own values. `serde_json::Value` is an acyclic tree, so the scan
/// needs no visited-set.
pub fn records(data: &Value) -> Vec<RawRecord> {
    if data.is_array() {
        return to_record_list(data);
    }
    let Some(envelope) = data.as_object() else {
        return Vec::new();
    };
    let target = reported_count(envelope).unwrap_or(0);

    for key in ENVELOPE_KEYS {
        if let Some(candidate) = envelope.get(*key) {
            let list = to_record_list(candidate);
            if !list.is_empty() && meets_count(list.len(), target) {
                return list;
            }
        }
    }

    let from_scan = scan_for_candidates(envelope, target);
    if !from_scan.is_empty() {
        return from_scan;
    }

    envelope
        .values()
        .filter_map(Value::as_object)
        .cloned()
        .collect()
}

/// Depth-first scan over nested values collecting every array-like or
/// object-of-objects; longest candidate wins, with the count-hint tie-break
/// preferred over raw length.
fn scan_for_candidates(envelope: &Map<String, Value>, target: u64) -> Vec<RawRecord> {
    let mut candidates: Vec<Vec<RawRecord>> = Vec::new();

    fn scan(value: &Value, candidates: &mut Vec<Vec<RawRecord>>) {
        let list = to_record_list(value);
        if !list.is_empty() {
            candidates.push(list);
        }
        if let Value::Object(obj) = value {
            for child in obj.values() {
                scan(child, candidates);
            }
        }
    }

    for value in envelope.values() {
        scan(value, &mut candidates);
    }

    // First-longest wins ties, matching feed insertion order.
    let mut best: Vec<RawRecord> = Vec::new();
    for candidate in &candidates {
        if candidate.len() > best.len() {
            best = candidate.clone();
        }
    }
    if target > 0 && !meets_count(best.len(), target) {
        if let Some(by_target) = candidates.into_iter().find(|c| meets_count(c.len(), target)) {
            return by_target;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(id: u64) -> Value {
        json!({ "id": id })
    }

    #[test]
    fn bare_array_passes_through() {
        let data = json!([{ "id": 1 }, { "id": 2 }]);
        let records = records(&data);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), Some(&json!(1)));
    }

    #[test]
    fn count_hint_rejects_the_wrong_envelope_key() {
        let results: Vec<Value> = (0..100).map(listing).collect();
        let data = json!({
            "count": 100,
            "results": results,
            "data": [listing(900), listing(901), listing(902)],
        });
        assert_eq!(records(&data).len(), 100);

        // Without the hint, `results` still wins on priority order.
        let data = json!({
            "results": [listing(1)],
            "data": [listing(2), listing(3)],
        });
        let out = records(&data);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("id"), Some(&json!(1)));
    }

    #[test]
    fn truncated_envelope_key_falls_through_to_scan() {
        let full: Vec<Value> = (0..50).map(listing).collect();
        let data = json!({
            "count": 50,
            "results": [listing(0), listing(1)],
            "pagination": { "page_data": full },
        });
        assert_eq!(records(&data).len(), 50);
    }

    #[test]
    fn deep_scan_prefers_longest_candidate() {
        let data = json!({
            "meta": { "flags": [listing(1)] },
            "payload": { "inner": { "rows": [listing(1), listing(2), listing(3)] } },
        });
        assert_eq!(records(&data).len(), 3);
    }

    #[test]
    fn object_of_objects_counts_as_a_record_list() {
        let data = json!({
            "listings": { "a": listing(1), "b": listing(2) },
        });
        assert_eq!(records(&data).len(), 2);
    }

    #[test]
    fn scalar_input_yields_no_records() {
        assert!(records(&json!("nope")).is_empty());
        assert!(records(&json!(null)).is_empty());
    }

    #[test]
    fn reported_count_reads_count_then_total() {
        let obj = json!({ "count": 7 });
        assert_eq!(reported_count(obj.as_object().unwrap()), Some(7));
        let obj = json!({ "total": 9 });
        assert_eq!(reported_count(obj.as_object().unwrap()), Some(9));
        let obj = json!({ "count": "7" });
        assert_eq!(reported_count(obj.as_object().unwrap()), None);
    }
}
