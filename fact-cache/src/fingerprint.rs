//! Deterministic fingerprint derivation for a mining call.
//!
//! `(account, window, filters, release-match-map, format-version)` ->
//! sha256 hex digest, used as the fact-cache key end to end.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize)]
pub struct FingerprintInput {
    pub account: i64,
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
    /// Canonicalized filter parameters (participant sets, label filters,
    /// pushers, etc), serialized with sorted keys by the caller before this
    /// struct is built so that equivalent filters always fingerprint
    /// identically regardless of original ordering.
    pub filters: serde_json::Value,
    /// Per-repository release-match fingerprints, sorted by repository name
    /// by the caller (see `prefixer::CompiledReleaseSettings::fingerprint`).
    pub release_match_fingerprints: Vec<String>,
    pub format_version: u32,
}

pub fn compute(input: &FingerprintInput) -> String {
    let mut hasher = Sha256::new();
    let canonical =
        serde_json::to_vec(input).expect("FingerprintInput contains only serializable fields");
    hasher.update(canonical);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input() -> FingerprintInput {
        FingerprintInput {
            account: 1,
            window_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            window_to: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            filters: serde_json::json!({"labels_include": ["bug"]}),
            release_match_fingerprints: vec!["abc".into()],
            format_version: 1,
        }
    }

    #[test]
    fn same_input_yields_same_fingerprint() {
        assert_eq!(compute(&input()), compute(&input()));
    }

    #[test]
    fn format_version_bump_changes_fingerprint() {
        let mut bumped = input();
        bumped.format_version += 1;
        assert_ne!(compute(&input()), compute(&bumped));
    }
}
