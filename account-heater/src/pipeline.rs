//! One account's heater pass (SPEC_FULL §4.6): per repository set, mine
//! releases, mine PR facts over the window, persist them, synthesize the
//! `Bots` team on first run, join deployment environments, and mark the
//! repository set precomputed.

use crate::deployments::join_deployment_environments;
use crate::error::HeaterResult;
use crate::facts_row::to_pr_facts_row;
use crate::teams::ensure_bots_team;
use chrono::{DateTime, Utc};
use fact_cache::FactCache;
use prefixer::{compile_all, CompiledReleaseSettings, Prefixer};
use pr_miner::model::{LabelFilter, ParticipantFilter, PrFacts};
use pr_miner::MiningRequest;
use release_miner::{mine_releases_cached, ReleaseMiningRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use storage_gateway::model::{AccountId, PrNodeId, RepositorySet, UserNodeId};
use storage_gateway::{MetadataStore, PersistentDataStore, PrecomputedStore, RequestContext, StateStore};

#[derive(Clone)]
pub struct HeaterStores {
    pub state: Arc<dyn StateStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub precomputed: Arc<dyn PrecomputedStore>,
    pub persistentdata: Arc<dyn PersistentDataStore>,
    pub cache: Arc<FactCache>,
}

#[derive(Debug, Default, Clone)]
pub struct AccountReport {
    pub account: AccountId,
    pub releases_mined: usize,
    pub prs_mined: usize,
    pub bots_created: usize,
    pub deployments_joined: usize,
    pub repository_sets_newly_precomputed: usize,
}

/// Runs one repository set's slice of the pass, returning the facts
/// mined (so the caller can fold counts across sets) and the commit
/// authors observed, needed for `Bots` team synthesis.
async fn heat_repository_set(
    stores: &HeaterStores,
    account: AccountId,
    repo_set: &RepositorySet,
    settings: &[CompiledReleaseSettings],
    window_from: DateTime<Utc>,
    window_to: DateTime<Utc>,
    ctx: &RequestContext,
) -> HeaterResult<(AccountReport, HashSet<UserNodeId>)> {
    let repo_names: Vec<String> = repo_set.repo_names().into_iter().map(String::from).collect();
    let repo_settings: Vec<CompiledReleaseSettings> = settings
        .iter()
        .filter(|s| repo_names.contains(&s.repository_full_name))
        .cloned()
        .collect();

    let release_request = ReleaseMiningRequest { settings: &repo_settings, hide_first_release: true };
    let releases = mine_releases_cached(
        stores.metadata.as_ref(),
        stores.precomputed.as_ref(),
        stores.cache.as_ref(),
        ctx,
        account,
        &release_request,
    )
    .await?;

    let released_at: HashMap<PrNodeId, DateTime<Utc>> = releases
        .iter()
        .flat_map(|r| r.prs.iter().map(move |pr_id| (*pr_id, r.published_at)))
        .collect();
    let release_fingerprints: Vec<String> = repo_settings.iter().map(|s| s.fingerprint.clone()).collect();

    let pr_request = MiningRequest {
        repositories: &repo_names,
        window_from,
        window_to,
        participants: &ParticipantFilter::default(),
        labels: &LabelFilter::default(),
        blacklist: &HashSet::new(),
        released_at: &released_at,
        exclude_inactive: false,
    };
    let bundles = pr_miner::mine_pull_requests_cached(
        stores.metadata.as_ref(),
        stores.cache.as_ref(),
        ctx,
        account,
        release_fingerprints,
        pr_request,
    )
    .await?;

    let mut commit_authors = HashSet::new();
    let mut user_ids: HashSet<UserNodeId> = HashSet::new();
    for bundle in &bundles {
        let facts: &PrFacts = &bundle.facts;
        commit_authors.extend(facts.participants.commit_authors.iter().copied());
        user_ids.extend(facts.participants.author);
        user_ids.extend(facts.participants.reviewers.iter().copied());
        user_ids.extend(facts.participants.commenters.iter().copied());
        user_ids.extend(facts.participants.commit_authors.iter().copied());
    }
    let prefixer = Prefixer::load(stores.metadata.as_ref(), &user_ids.into_iter().collect::<Vec<_>>(), &[]).await?;

    for bundle in &bundles {
        let row = to_pr_facts_row(bundle, &repo_settings, &prefixer);
        stores.precomputed.put_pr_facts(row).await?;
    }

    let mut report = AccountReport {
        account,
        releases_mined: releases.len(),
        prs_mined: bundles.len(),
        bots_created: 0,
        deployments_joined: 0,
        repository_sets_newly_precomputed: 0,
    };

    if !repo_set.precomputed {
        report.bots_created = ensure_bots_team(stores.state.as_ref(), account, &commit_authors, &prefixer).await?;
    }

    let joined = join_deployment_environments(stores.persistentdata.as_ref(), &repo_settings, &releases).await?;
    report.deployments_joined = joined.len();

    if !repo_set.precomputed {
        stores.state.mark_precomputed(repo_set.id).await?;
        report.repository_sets_newly_precomputed = 1;
    }

    Ok((report, commit_authors))
}

/// Runs the full pass for one account across every repository set it owns.
pub async fn heat_account(
    stores: &HeaterStores,
    account: AccountId,
    window_from: DateTime<Utc>,
    window_to: DateTime<Utc>,
    ctx: &RequestContext,
) -> HeaterResult<AccountReport> {
    let raw_settings = stores.state.get_release_match_settings(account).await?;
    let settings = compile_all(&raw_settings)?;
    let repo_sets = stores.state.list_repository_sets(account).await?;

    let mut total = AccountReport { account, ..Default::default() };
    for repo_set in &repo_sets {
        let (report, _commit_authors) =
            heat_repository_set(stores, account, repo_set, &settings, window_from, window_to, ctx).await?;
        total.releases_mined += report.releases_mined;
        total.prs_mined += report.prs_mined;
        total.bots_created += report.bots_created;
        total.deployments_joined += report.deployments_joined;
        total.repository_sets_newly_precomputed += report.repository_sets_newly_precomputed;
    }
    Ok(total)
}
