//! normalize/mod.rs
//!
//! Normalization of untrusted backend records into `VitalRecord`s.
//!
//! The backend is loose about shapes: timestamps arrive in seconds or
//! milliseconds, heart rate may be spelled `heart_rate` or `hr`, and any
//! field may be missing or mistyped. Everything here is total - bad input
//! degrades to `None`/0, it never errors.

use serde_json::Value;

use crate::types::VitalRecord;

/// Timestamps below this magnitude are seconds since epoch; at or above,
/// already milliseconds. Values near the year-2001 second boundary are a
/// known ambiguity of this heuristic; the threshold is kept for
/// compatibility with the device fleet.
pub const MS_THRESHOLD: i64 = 1_000_000_000_000;

/// Resolve a raw timestamp to milliseconds since epoch.
///
/// Zero (the "absent" sentinel) stays zero; values below `MS_THRESHOLD` are
/// treated as seconds and scaled up; anything else passes through.
pub fn epoch_ms(ts: i64) -> i64 {
    if ts == 0 {
        0
    } else if ts < MS_THRESHOLD {
        ts.saturating_mul(1000)
    } else {
        ts
    }
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn opt_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

fn raw_ts(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Map one raw backend record to the canonical shape.
///
/// `heart_rate` wins over `hr` when both carry a number; exactly one source
/// field determines the canonical value. Unreadable `ts` collapses to 0,
/// which `epoch_ms` keeps at the epoch.
pub fn normalize_record(raw: &Value) -> VitalRecord {
    let heart_rate = opt_f64(raw.get("heart_rate")).or_else(|| opt_f64(raw.get("hr")));
    VitalRecord {
        id: opt_string(raw.get("id")),
        user_id: opt_string(raw.get("userId")),
        device_id: opt_string(raw.get("device_id")),
        spo2: opt_f64(raw.get("spo2")),
        heart_rate,
        ts: raw_ts(raw.get("ts")),
    }
}

/// Normalize a whole response body into timeline order.
///
/// A non-array body is treated as an empty batch. Records are stable-sorted
/// descending by normalized timestamp (ties keep backend order), then
/// de-duplicated by identity key keeping the newest occurrence.
pub fn normalize_response(body: &Value) -> Vec<VitalRecord> {
    let items = match body.as_array() {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut records: Vec<VitalRecord> = items.iter().map(normalize_record).collect();
    records.sort_by_key(|r| std::cmp::Reverse(epoch_ms(r.ts)));

    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.identity_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_ms_scales_seconds() {
        assert_eq!(epoch_ms(1000), 1_000_000);
        assert_eq!(epoch_ms(1_692_000_000), 1_692_000_000_000);
    }

    #[test]
    fn epoch_ms_passes_millis_through() {
        assert_eq!(epoch_ms(1_000_000_000_000), 1_000_000_000_000);
        assert_eq!(epoch_ms(1_692_000_000_123), 1_692_000_000_123);
    }

    #[test]
    fn epoch_ms_keeps_zero() {
        assert_eq!(epoch_ms(0), 0);
    }

    #[test]
    fn heart_rate_field_wins_over_hr() {
        let r = normalize_record(&json!({ "heart_rate": 68, "hr": 72 }));
        assert_eq!(r.heart_rate, Some(68.0));
    }

    #[test]
    fn hr_fallback_when_heart_rate_absent() {
        let r = normalize_record(&json!({ "hr": 72, "ts": 1000 }));
        assert_eq!(r.heart_rate, Some(72.0));
        assert_eq!(r.ts, 1000);
    }

    #[test]
    fn missing_fields_become_none() {
        let r = normalize_record(&json!({}));
        assert_eq!(r.id, None);
        assert_eq!(r.user_id, None);
        assert_eq!(r.device_id, None);
        assert_eq!(r.spo2, None);
        assert_eq!(r.heart_rate, None);
        assert_eq!(r.ts, 0);
    }

    #[test]
    fn mistyped_fields_become_none() {
        let r = normalize_record(&json!({ "spo2": "97", "ts": "not a number", "id": 17 }));
        assert_eq!(r.spo2, None);
        assert_eq!(r.ts, 0);
        // numeric ids are stringified, they are identifiers not quantities
        assert_eq!(r.id, Some("17".into()));
    }

    #[test]
    fn non_array_body_is_empty_batch() {
        assert!(normalize_response(&json!({ "detail": "oops" })).is_empty());
        assert!(normalize_response(&json!(null)).is_empty());
    }

    #[test]
    fn response_sorts_descending_mixed_units() {
        // 2_000_000_000 s = 2e12 ms sorts above 1.5e12 ms despite the raw
        // second value being numerically smaller
        let body = json!([
            { "id": "a", "ts": 1_500_000_000_000i64 },
            { "id": "b", "ts": 2_000_000_000i64 },
        ]);
        let records = normalize_response(&body);
        assert_eq!(epoch_ms(records[0].ts), 2_000_000_000_000);
        let ids: Vec<_> = records.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn equal_timestamps_keep_backend_order() {
        let body = json!([
            { "id": "first", "ts": 1000 },
            { "id": "second", "ts": 1000 },
        ]);
        let records = normalize_response(&body);
        let ids: Vec<_> = records.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn duplicate_identities_keep_newest() {
        let body = json!([
            { "id": "a", "ts": 1000, "spo2": 95 },
            { "id": "a", "ts": 2000, "spo2": 97 },
            { "userId": "u", "device_id": "d", "ts": 500 },
            { "userId": "u", "device_id": "d", "ts": 500 },
        ]);
        let records = normalize_response(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].spo2, Some(97.0));
        assert_eq!(records[1].user_id, Some("u".into()));
    }
}
