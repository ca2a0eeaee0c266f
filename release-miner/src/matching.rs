//! Resolves which tags/branches constitute a release per repository
//! settings (SPEC_FULL §4.3).

use crate::model::Release;
use prefixer::CompiledReleaseSettings;
use std::collections::HashSet;
use storage_gateway::model::{RawBranch, RawTag, ReleaseMatchKind};

/// Resolves releases for one repository from its tags/branches, honoring
/// `tag`, `branch`, and `tag_or_branch` match kinds. `event`-matched
/// repositories produce no releases here — those come from a deployment
/// join the account heater performs directly against the persistentdata
/// store (SPEC_FULL §4.6), since no DAG walk is needed for discovery.
pub fn resolve_releases(
    settings: &CompiledReleaseSettings,
    tags: &[RawTag],
    branches: &[RawBranch],
) -> Vec<Release> {
    match settings.match_kind {
        ReleaseMatchKind::Tag => tags
            .iter()
            .filter(|t| settings.tag_matches(&t.name))
            .map(|t| from_tag(settings, t))
            .collect(),
        ReleaseMatchKind::Branch => branches
            .iter()
            .filter(|b| settings.branch_matches(&b.name))
            .map(|b| from_branch(settings, b))
            .collect(),
        ReleaseMatchKind::Event => Vec::new(),
    }
}

/// `tag_or_branch`: tag matching takes precedence; a commit not reachable
/// from any matching tag falls back to branch matching. Reachability here
/// is approximated by "not the target of any matching tag" since the full
/// ancestor check is performed later during PR linkage over the DAG.
pub fn resolve_releases_tag_or_branch(
    settings: &CompiledReleaseSettings,
    tags: &[RawTag],
    branches: &[RawBranch],
) -> Vec<Release> {
    let tag_releases: Vec<Release> = tags
        .iter()
        .filter(|t| settings.tag_matches(&t.name))
        .map(|t| from_tag(settings, t))
        .collect();
    let tagged_shas: HashSet<&str> = tag_releases.iter().map(|r| r.commit_sha.as_str()).collect();
    let branch_releases: Vec<Release> = branches
        .iter()
        .filter(|b| settings.branch_matches(&b.name) && !tagged_shas.contains(b.head_sha.as_str()))
        .map(|b| from_branch(settings, b))
        .collect();
    tag_releases.into_iter().chain(branch_releases).collect()
}

fn from_tag(settings: &CompiledReleaseSettings, tag: &RawTag) -> Release {
    Release {
        repository_full_name: settings.repository_full_name.clone(),
        identity: tag.name.clone(),
        commit_sha: tag.target_sha.clone(),
        matched_by: ReleaseMatchKind::Tag,
        published_at: tag.created_at,
        commit_authors: HashSet::new(),
        prs: Vec::new(),
    }
}

fn from_branch(settings: &CompiledReleaseSettings, branch: &RawBranch) -> Release {
    Release {
        repository_full_name: settings.repository_full_name.clone(),
        identity: branch.name.clone(),
        commit_sha: branch.head_sha.clone(),
        matched_by: ReleaseMatchKind::Branch,
        published_at: branch.updated_at,
        commit_authors: HashSet::new(),
        prs: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storage_gateway::model::RawReleaseMatchConfig;

    fn settings() -> CompiledReleaseSettings {
        CompiledReleaseSettings::compile(&RawReleaseMatchConfig {
            repository_full_name: "org/repo".into(),
            match_kind: ReleaseMatchKind::Tag,
            tag_regex: Some(r"^v\d+\.\d+\.\d+$".into()),
            branch_glob: None,
            tag_or_branch: false,
        })
        .unwrap()
    }

    #[test]
    fn resolves_only_matching_tags() {
        let tags = vec![
            RawTag { repository_full_name: "org/repo".into(), name: "v1.0.0".into(), target_sha: "a".into(), created_at: Utc::now() },
            RawTag { repository_full_name: "org/repo".into(), name: "latest".into(), target_sha: "b".into(), created_at: Utc::now() },
        ];
        let releases = resolve_releases(&settings(), &tags, &[]);
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].identity, "v1.0.0");
    }
}
