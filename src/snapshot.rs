//! snapshot.rs
//!
//! Cheap change detection over a sorted record batch.
//!
//! The fingerprint is an equality heuristic, not a content hash: it covers
//! the newest timestamp and the identities of the newest few records only.
//! Edits beyond that depth, or to non-identifying fields of old records, go
//! unnoticed - an accepted trade-off to keep refreshes cheap.

use crate::types::VitalRecord;

/// How many of the newest records contribute their identity.
const FINGERPRINT_DEPTH: usize = 20;

/// Fingerprint a batch already sorted descending by normalized timestamp.
///
/// Empty input yields the literal `"empty"`; otherwise
/// `"<newestRawTs>:<id1>|<id2>|...|<idN>"` with N = min(20, len). Identical
/// sorted input always yields identical output. Never use this for identity
/// or anything security-relevant.
pub fn fingerprint(sorted: &[VitalRecord]) -> String {
    if sorted.is_empty() {
        return "empty".to_string();
    }
    let ids: Vec<String> = sorted
        .iter()
        .take(FINGERPRINT_DEPTH)
        .map(VitalRecord::identity_key)
        .collect();
    format!("{}:{}", sorted[0].ts, ids.join("|"))
}
