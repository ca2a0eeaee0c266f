//! Orchestrates release discovery, PR linkage, and first-release hiding
//! for a set of repositories in one account.

use crate::dag::link_prs_to_releases;
use crate::error::ReleaseMinerResult;
use crate::first_release::hide_first_releases;
use crate::matching::{resolve_releases, resolve_releases_tag_or_branch};
use crate::model::Release;
use prefixer::CompiledReleaseSettings;
use storage_gateway::{MetadataStore, PrecomputedStore};

pub const FORMAT_VERSION: u32 = 1;

/// One account's compiled match settings, paired with the stores to pull
/// tags/branches/commits/DAG from. Settings are produced by
/// `prefixer::compile_all` against `StateStore::get_release_match_settings`.
pub struct ReleaseMiningRequest<'a> {
    pub settings: &'a [CompiledReleaseSettings],
    pub hide_first_release: bool,
}

pub async fn mine_releases(
    metadata: &dyn MetadataStore,
    precomputed: &dyn PrecomputedStore,
    request: &ReleaseMiningRequest<'_>,
) -> ReleaseMinerResult<Vec<Release>> {
    let repos: Vec<String> = request
        .settings
        .iter()
        .map(|s| s.repository_full_name.clone())
        .collect();
    let tags = metadata.fetch_tags(&repos).await?;
    let branches = metadata.fetch_branches(&repos).await?;

    let mut all_releases = Vec::new();
    for settings in request.settings {
        let repo_tags: Vec<_> = tags
            .iter()
            .filter(|t| t.repository_full_name == settings.repository_full_name)
            .cloned()
            .collect();
        let repo_branches: Vec<_> = branches
            .iter()
            .filter(|b| b.repository_full_name == settings.repository_full_name)
            .cloned()
            .collect();

        let mut releases = if settings.tag_or_branch {
            resolve_releases_tag_or_branch(settings, &repo_tags, &repo_branches)
        } else {
            resolve_releases(settings, &repo_tags, &repo_branches)
        };

        if !releases.is_empty() {
            if let Some(dag) = precomputed
                .get_commit_dag(&settings.repository_full_name, FORMAT_VERSION)
                .await?
            {
                let shas: Vec<String> = dag.parents.keys().cloned().collect();
                let commits = metadata.fetch_commits(&shas).await?;
                let links = metadata.fetch_pr_commit_links_by_sha(&shas).await?;
                link_prs_to_releases(&mut releases, &dag, &links, &commits);
            }
        }

        all_releases.extend(releases);
    }

    if request.hide_first_release {
        all_releases = hide_first_releases(all_releases);
    }

    Ok(all_releases)
}
