//! Compiled, per-repository release-match rules and their fingerprints.

use crate::error::{PrefixerError, PrefixerResult};
use globset::{Glob, GlobMatcher};
use regex::Regex;
use sha2::{Digest, Sha256};
use storage_gateway::model::{RawReleaseMatchConfig, ReleaseMatchKind};

/// A release-match rule, compiled once per account/settings-load and reused
/// across mining calls. `tag_or_branch` tries the tag matcher first.
#[derive(Debug, Clone)]
pub struct CompiledReleaseSettings {
    pub repository_full_name: String,
    pub match_kind: ReleaseMatchKind,
    pub tag_regex: Option<Regex>,
    pub branch_glob: Option<GlobMatcher>,
    pub tag_or_branch: bool,
    /// Stable fingerprint of this repository's match rule; feeds into the
    /// fact-cache request fingerprint (SPEC_FULL §4.5).
    pub fingerprint: String,
}

impl CompiledReleaseSettings {
    pub fn compile(raw: &RawReleaseMatchConfig) -> PrefixerResult<Self> {
        let tag_regex = raw
            .tag_regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| PrefixerError::InvalidTagRegex {
                repository: raw.repository_full_name.clone(),
                source,
            })?;
        let branch_glob = raw
            .branch_glob
            .as_deref()
            .map(|pattern| Glob::new(pattern).map(|g| g.compile_matcher()))
            .transpose()
            .map_err(|source| PrefixerError::InvalidBranchGlob {
                repository: raw.repository_full_name.clone(),
                source,
            })?;

        let fingerprint = fingerprint_of(raw);

        Ok(Self {
            repository_full_name: raw.repository_full_name.clone(),
            match_kind: raw.match_kind,
            tag_regex,
            branch_glob,
            tag_or_branch: raw.tag_or_branch,
            fingerprint,
        })
    }

    pub fn tag_matches(&self, tag_name: &str) -> bool {
        self.tag_regex.as_ref().map(|re| re.is_match(tag_name)).unwrap_or(false)
    }

    pub fn branch_matches(&self, branch_name: &str) -> bool {
        self.branch_glob.as_ref().map(|g| g.is_match(branch_name)).unwrap_or(false)
    }
}

/// Deterministic hash of the match rule shape, independent of field
/// iteration order, used as the per-repository release fingerprint.
fn fingerprint_of(raw: &RawReleaseMatchConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.repository_full_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(format!("{:?}", raw.match_kind).as_bytes());
    hasher.update([0u8]);
    hasher.update(raw.tag_regex.as_deref().unwrap_or("").as_bytes());
    hasher.update([0u8]);
    hasher.update(raw.branch_glob.as_deref().unwrap_or("").as_bytes());
    hasher.update([0u8]);
    hasher.update([raw.tag_or_branch as u8]);
    format!("{:x}", hasher.finalize())
}

/// Compiles every repository's settings, failing fast on the first invalid
/// rule (an operator-facing config error, not a per-repo transient one).
pub fn compile_all(raw: &[RawReleaseMatchConfig]) -> PrefixerResult<Vec<CompiledReleaseSettings>> {
    raw.iter().map(CompiledReleaseSettings::compile).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RawReleaseMatchConfig {
        RawReleaseMatchConfig {
            repository_full_name: "org/repo".into(),
            match_kind: ReleaseMatchKind::Tag,
            tag_regex: Some(r"^v\d+\.\d+\.\d+$".into()),
            branch_glob: None,
            tag_or_branch: false,
        }
    }

    #[test]
    fn fingerprint_is_stable_for_identical_input() {
        let a = fingerprint_of(&cfg());
        let b = fingerprint_of(&cfg());
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_changes_when_regex_changes() {
        let mut other = cfg();
        other.tag_regex = Some(r"^release-.*$".into());
        assert_ne!(fingerprint_of(&cfg()), fingerprint_of(&other));
    }

    #[test]
    fn tag_regex_matches_semver_tags() {
        let compiled = CompiledReleaseSettings::compile(&cfg()).unwrap();
        assert!(compiled.tag_matches("v1.2.3"));
        assert!(!compiled.tag_matches("latest"));
    }

    #[test]
    fn branch_glob_matches() {
        let mut raw = cfg();
        raw.match_kind = ReleaseMatchKind::Branch;
        raw.tag_regex = None;
        raw.branch_glob = Some("release/*".into());
        let compiled = CompiledReleaseSettings::compile(&raw).unwrap();
        assert!(compiled.branch_matches("release/2024-01"));
        assert!(!compiled.branch_matches("main"));
    }
}
