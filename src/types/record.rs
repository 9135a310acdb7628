//! types/record.rs
//!
//! Defines `VitalRecord`, the canonical shape of one telemetry sample, and
//! `Timeline`, the published descending-sorted sequence of records.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One normalized telemetry sample from the wearable device.
///
/// Built from untrusted backend JSON by `normalize::normalize_record`; every
/// field the backend may omit is optional. `ts` is carried exactly as
/// received (seconds or milliseconds since epoch, 0 when absent) and is only
/// resolved to milliseconds at the point of use via `normalize::epoch_ms`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub spo2: Option<f64>,
    pub heart_rate: Option<f64>,
    pub ts: i64,
}

impl VitalRecord {
    /// Identity key for de-duplication and fingerprinting: the explicit `id`
    /// when present and non-empty, otherwise a `userId-device_id-ts`
    /// composite.
    pub fn identity_key(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!(
                "{}-{}-{}",
                self.user_id.as_deref().unwrap_or(""),
                self.device_id.as_deref().unwrap_or(""),
                self.ts
            ),
        }
    }
}

/// The published timeline: descending by normalized timestamp, stable for
/// equal timestamps, de-duplicated by identity key. Replaced wholesale on
/// each accepted refresh; the `Arc` lets consumers observe that a refresh
/// with no visible change republished nothing.
pub type Timeline = Arc<Vec<VitalRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(ts: i64) -> VitalRecord {
        VitalRecord {
            id: None,
            user_id: None,
            device_id: None,
            spo2: None,
            heart_rate: None,
            ts,
        }
    }

    #[test]
    fn explicit_id_wins_over_composite() {
        let mut r = bare(42);
        r.id = Some("rec-1".into());
        r.user_id = Some("u1".into());
        assert_eq!(r.identity_key(), "rec-1");
    }

    #[test]
    fn empty_id_falls_back_to_composite() {
        let mut r = bare(42);
        r.id = Some(String::new());
        r.user_id = Some("u1".into());
        r.device_id = Some("d1".into());
        assert_eq!(r.identity_key(), "u1-d1-42");
    }

    #[test]
    fn composite_tolerates_missing_parts() {
        assert_eq!(bare(7).identity_key(), "--7");
    }
}
