//! In-memory reference implementations of the four store traits.
//!
//! These stand in for the real database/memcached drivers that SPEC_FULL §1
//! names as out of scope. They are complete enough to exercise every
//! algorithm in this repository end to end (used by the heater CLI's
//! default wiring and by every crate's integration tests) but hold
//! everything in a `DashMap`, with no persistence across process restarts.

use crate::error::{StorageError, StorageResult};
use crate::model::*;
use crate::stores::{MetadataStore, PersistentDataStore, PrecomputedStore, StateStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStateStore {
    accounts: DashMap<AccountId, Account>,
    repo_sets: DashMap<RepositorySetId, RepositorySet>,
    teams: DashMap<AccountId, Vec<Team>>,
    release_settings: DashMap<AccountId, Vec<RawReleaseMatchConfig>>,
    next_team_id: std::sync::atomic::AtomicI64,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            next_team_id: std::sync::atomic::AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn seed_account(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    pub fn seed_repository_set(&self, set: RepositorySet) {
        self.repo_sets.insert(set.id, set);
    }

    pub fn seed_teams(&self, account: AccountId, teams: Vec<Team>) {
        let max_id = teams.iter().map(|t| t.id).max().unwrap_or(0);
        self.teams.insert(account, teams);
        self.next_team_id
            .fetch_max(max_id + 1, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn seed_release_settings(&self, account: AccountId, settings: Vec<RawReleaseMatchConfig>) {
        self.release_settings.insert(account, settings);
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_account(&self, id: AccountId) -> StorageResult<Account> {
        self.accounts
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| StorageError::NotFound(format!("account {id}")))
    }

    async fn list_active_accounts(&self, now: DateTime<Utc>) -> StorageResult<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.is_active(now))
            .map(|a| a.clone())
            .collect())
    }

    async fn get_repository_set(&self, id: RepositorySetId) -> StorageResult<RepositorySet> {
        self.repo_sets
            .get(&id)
            .map(|s| s.clone())
            .ok_or_else(|| StorageError::NotFound(format!("repository set {id}")))
    }

    async fn list_repository_sets(&self, account: AccountId) -> StorageResult<Vec<RepositorySet>> {
        Ok(self
            .repo_sets
            .iter()
            .filter(|s| s.account_id == account)
            .map(|s| s.clone())
            .collect())
    }

    async fn list_teams(&self, account: AccountId) -> StorageResult<Vec<Team>> {
        Ok(self.teams.get(&account).map(|t| t.clone()).unwrap_or_default())
    }

    async fn upsert_team(&self, mut team: Team) -> StorageResult<TeamId> {
        if team.id == 0 {
            team.id = self
                .next_team_id
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
        let id = team.id;
        self.teams
            .entry(team.account_id)
            .or_default()
            .retain(|t| t.id != id);
        self.teams.entry(team.account_id).or_default().push(team);
        Ok(id)
    }

    async fn get_release_match_settings(
        &self,
        account: AccountId,
    ) -> StorageResult<Vec<RawReleaseMatchConfig>> {
        Ok(self
            .release_settings
            .get(&account)
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    async fn mark_precomputed(&self, repo_set: RepositorySetId) -> StorageResult<()> {
        let mut entry = self
            .repo_sets
            .get_mut(&repo_set)
            .ok_or_else(|| StorageError::NotFound(format!("repository set {repo_set}")))?;
        if !entry.precomputed {
            entry.precomputed = true;
            entry.updates_count += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMetadataStore {
    prs: DashMap<PrNodeId, RawPullRequest>,
    reviews: DashMap<PrNodeId, Vec<RawReview>>,
    review_requests: DashMap<PrNodeId, Vec<RawReviewRequest>>,
    comments: DashMap<PrNodeId, Vec<RawComment>>,
    commits: DashMap<String, RawCommit>,
    pr_commit_links: DashMap<PrNodeId, Vec<String>>,
    labels: DashMap<PrNodeId, Vec<RawLabel>>,
    tags: DashMap<String, Vec<RawTag>>,
    branches: DashMap<String, Vec<RawBranch>>,
    check_runs: DashMap<String, Vec<RawCheckRun>>,
    user_logins: DashMap<UserNodeId, String>,
    repo_names: DashMap<RepoNodeId, String>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_pr(&self, pr: RawPullRequest) {
        self.prs.insert(pr.node_id, pr);
    }

    pub fn seed_reviews(&self, pr_id: PrNodeId, reviews: Vec<RawReview>) {
        self.reviews.insert(pr_id, reviews);
    }

    pub fn seed_review_requests(&self, pr_id: PrNodeId, reqs: Vec<RawReviewRequest>) {
        self.review_requests.insert(pr_id, reqs);
    }

    pub fn seed_comments(&self, pr_id: PrNodeId, comments: Vec<RawComment>) {
        self.comments.insert(pr_id, comments);
    }

    pub fn seed_commit(&self, commit: RawCommit) {
        self.commits.insert(commit.sha.clone(), commit);
    }

    pub fn seed_pr_commit_links(&self, pr_id: PrNodeId, shas: Vec<String>) {
        self.pr_commit_links.insert(pr_id, shas);
    }

    pub fn seed_labels(&self, pr_id: PrNodeId, labels: Vec<RawLabel>) {
        self.labels.insert(pr_id, labels);
    }

    pub fn seed_tags(&self, repo: &str, tags: Vec<RawTag>) {
        self.tags.insert(repo.to_string(), tags);
    }

    pub fn seed_branches(&self, repo: &str, branches: Vec<RawBranch>) {
        self.branches.insert(repo.to_string(), branches);
    }

    pub fn seed_check_runs(&self, repo: &str, runs: Vec<RawCheckRun>) {
        self.check_runs.entry(repo.to_string()).or_default().extend(runs);
    }

    pub fn seed_user_login(&self, id: UserNodeId, login: &str) {
        self.user_logins.insert(id, login.to_string());
    }

    pub fn seed_repo_name(&self, id: RepoNodeId, name: &str) {
        self.repo_names.insert(id, name.to_string());
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn fetch_prs_in_window(
        &self,
        repos: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StorageResult<Vec<RawPullRequest>> {
        Ok(self
            .prs
            .iter()
            .filter(|pr| repos.iter().any(|r| r == &pr.repository_full_name))
            .filter(|pr| {
                let end = pr.closed_at.unwrap_or(to.max(pr.created_at));
                pr.created_at <= to && end >= from
            })
            .map(|pr| pr.clone())
            .collect())
    }

    async fn fetch_prs_by_ids(&self, ids: &[PrNodeId]) -> StorageResult<Vec<RawPullRequest>> {
        Ok(ids.iter().filter_map(|id| self.prs.get(id).map(|p| p.clone())).collect())
    }

    async fn fetch_reviews(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawReview>> {
        Ok(pr_ids
            .iter()
            .filter_map(|id| self.reviews.get(id).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_review_requests(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawReviewRequest>> {
        Ok(pr_ids
            .iter()
            .filter_map(|id| self.review_requests.get(id).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_comments(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawComment>> {
        Ok(pr_ids
            .iter()
            .filter_map(|id| self.comments.get(id).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_commits(&self, shas: &[String]) -> StorageResult<Vec<RawCommit>> {
        Ok(shas.iter().filter_map(|s| self.commits.get(s).map(|c| c.clone())).collect())
    }

    async fn fetch_pr_commit_links(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawPrCommitLink>> {
        Ok(pr_ids
            .iter()
            .filter_map(|id| self.pr_commit_links.get(id).map(|shas| (*id, shas.clone())))
            .flat_map(|(id, shas)| {
                shas.into_iter().map(move |sha| RawPrCommitLink {
                    pr_node_id: id,
                    commit_sha: sha,
                })
            })
            .collect())
    }

    async fn fetch_pr_commit_links_by_sha(
        &self,
        commit_shas: &[String],
    ) -> StorageResult<Vec<RawPrCommitLink>> {
        let sha_set: std::collections::HashSet<&str> =
            commit_shas.iter().map(|s| s.as_str()).collect();
        Ok(self
            .pr_commit_links
            .iter()
            .flat_map(|e| {
                let id = *e.key();
                e.value()
                    .iter()
                    .filter(|sha| sha_set.contains(sha.as_str()))
                    .map(move |sha| RawPrCommitLink { pr_node_id: id, commit_sha: sha.clone() })
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    async fn fetch_labels(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawLabel>> {
        Ok(pr_ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_tags(&self, repos: &[String]) -> StorageResult<Vec<RawTag>> {
        Ok(repos
            .iter()
            .filter_map(|r| self.tags.get(r).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_branches(&self, repos: &[String]) -> StorageResult<Vec<RawBranch>> {
        Ok(repos
            .iter()
            .filter_map(|r| self.branches.get(r).map(|v| v.clone()))
            .flatten()
            .collect())
    }

    async fn fetch_check_runs_in_window(
        &self,
        repos: &[String],
        pushers: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StorageResult<Vec<RawCheckRun>> {
        Ok(self
            .check_runs
            .iter()
            .filter(|e| repos.iter().any(|r| r == e.key()))
            .flat_map(|e| e.value().clone())
            .filter(|run| run.started_at >= from && run.started_at <= to)
            .filter(|run| {
                pushers.is_empty()
                    || run
                        .author
                        .map(|a| pushers.iter().any(|p| self.user_logins.get(&a).map(|l| l.as_str() == p).unwrap_or(false)))
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn fetch_check_runs_for_prs(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawCheckRun>> {
        Ok(self
            .check_runs
            .iter()
            .flat_map(|e| e.value().clone())
            .filter(|run| run.pull_request_node_id.map(|id| pr_ids.contains(&id)).unwrap_or(false))
            .collect())
    }

    async fn fetch_user_logins(
        &self,
        user_ids: &[UserNodeId],
    ) -> StorageResult<HashMap<UserNodeId, String>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.user_logins.get(id).map(|l| (*id, l.clone())))
            .collect())
    }

    async fn fetch_repo_full_names(
        &self,
        node_ids: &[RepoNodeId],
    ) -> StorageResult<HashMap<RepoNodeId, String>> {
        Ok(node_ids
            .iter()
            .filter_map(|id| self.repo_names.get(id).map(|n| (*id, n.clone())))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryPrecomputedStore {
    facts: DashMap<String, FactCacheEntry>,
    commit_dags: DashMap<(String, u32), CommitDag>,
    pr_facts: RwLock<Vec<PrFactsRow>>,
}

impl InMemoryPrecomputedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrecomputedStore for InMemoryPrecomputedStore {
    async fn get_fact(&self, fingerprint: &str) -> StorageResult<Option<FactCacheEntry>> {
        Ok(self.facts.get(fingerprint).map(|e| e.clone()))
    }

    async fn put_fact(&self, entry: FactCacheEntry) -> StorageResult<()> {
        self.facts.insert(entry.fingerprint.clone(), entry);
        Ok(())
    }

    async fn get_commit_dag(
        &self,
        repository_full_name: &str,
        format_version: u32,
    ) -> StorageResult<Option<CommitDag>> {
        Ok(self
            .commit_dags
            .get(&(repository_full_name.to_string(), format_version))
            .map(|d| d.clone()))
    }

    async fn put_commit_dag(&self, dag: CommitDag, format_version: u32) -> StorageResult<()> {
        self.commit_dags
            .insert((dag.repository_full_name.clone(), format_version), dag);
        Ok(())
    }

    async fn list_pr_facts(
        &self,
        _account: AccountId,
        category: PrFactsCategory,
    ) -> StorageResult<Vec<PrFactsRow>> {
        Ok(self
            .pr_facts
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect())
    }

    async fn put_pr_facts(&self, row: PrFactsRow) -> StorageResult<()> {
        let mut rows = self.pr_facts.write().unwrap();
        rows.retain(|r| {
            !(r.pr_node_id == row.pr_node_id
                && r.release_match == row.release_match
                && r.format_version == row.format_version)
        });
        rows.push(row);
        Ok(())
    }

    async fn update_pr_facts_labels(
        &self,
        pr_node_id: PrNodeId,
        release_match: &str,
        format_version: u32,
        labels: HashMap<String, DateTime<Utc>>,
    ) -> StorageResult<()> {
        let mut rows = self.pr_facts.write().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| {
                r.pr_node_id == pr_node_id
                    && r.release_match == release_match
                    && r.format_version == format_version
            })
            .ok_or_else(|| StorageError::NotFound(format!("pr facts row {pr_node_id}")))?;
        row.labels = labels;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPersistentDataStore {
    deployments: DashMap<String, Vec<RawDeploymentEvent>>,
}

impl InMemoryPersistentDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_deployment(&self, event: RawDeploymentEvent) {
        self.deployments
            .entry(event.repository_full_name.clone())
            .or_default()
            .push(event);
    }
}

#[async_trait]
impl PersistentDataStore for InMemoryPersistentDataStore {
    async fn fetch_deployment_events(
        &self,
        repository_full_name: &str,
        commit_shas: &[String],
    ) -> StorageResult<Vec<RawDeploymentEvent>> {
        Ok(self
            .deployments
            .get(repository_full_name)
            .map(|v| {
                v.iter()
                    .filter(|e| commit_shas.contains(&e.commit_sha))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mark_precomputed_bumps_updates_count_once() {
        let store = InMemoryStateStore::new();
        store.seed_repository_set(RepositorySet {
            id: 1,
            account_id: 1,
            repositories: vec![],
            updates_count: 0,
            precomputed: false,
        });
        store.mark_precomputed(1).await.unwrap();
        store.mark_precomputed(1).await.unwrap();
        let set = store.get_repository_set(1).await.unwrap();
        assert!(set.precomputed);
        assert_eq!(set.updates_count, 1);
    }
}
