//! Uniform async interfaces to the four logical stores.
//!
//! Database driver glue is explicitly out of scope (see SPEC_FULL §1): these
//! traits are the full interface surface a real Postgres/SQLite/Memcached
//! backend would implement. [`crate::mock`] provides in-memory
//! implementations used by tests and by the heater CLI's default wiring.

use crate::error::StorageResult;
use crate::model::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Tenant configuration and lifecycle: accounts, repository sets, teams,
/// release-match settings.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_account(&self, id: AccountId) -> StorageResult<Account>;
    async fn list_active_accounts(&self, now: DateTime<Utc>) -> StorageResult<Vec<Account>>;
    async fn get_repository_set(&self, id: RepositorySetId) -> StorageResult<RepositorySet>;
    async fn list_repository_sets(&self, account: AccountId) -> StorageResult<Vec<RepositorySet>>;
    async fn list_teams(&self, account: AccountId) -> StorageResult<Vec<Team>>;
    async fn upsert_team(&self, team: Team) -> StorageResult<TeamId>;
    async fn get_release_match_settings(
        &self,
        account: AccountId,
    ) -> StorageResult<Vec<RawReleaseMatchConfig>>;

    /// Atomically sets `precomputed = true` and bumps `updates_count` the
    /// first time a heater pass completes for this repository set
    /// (SPEC_FULL §4.6). A no-op (but still `Ok`) if already precomputed.
    async fn mark_precomputed(&self, repo_set: RepositorySetId) -> StorageResult<()>;
}

/// Read-only access to ingested GitHub/GitLab metadata: PRs, reviews,
/// commits, labels, tags, branches, check runs.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn fetch_prs_in_window(
        &self,
        repos: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StorageResult<Vec<RawPullRequest>>;

    async fn fetch_prs_by_ids(&self, ids: &[PrNodeId]) -> StorageResult<Vec<RawPullRequest>>;
    async fn fetch_reviews(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawReview>>;
    async fn fetch_review_requests(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawReviewRequest>>;
    async fn fetch_comments(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawComment>>;
    async fn fetch_commits(&self, shas: &[String]) -> StorageResult<Vec<RawCommit>>;
    async fn fetch_pr_commit_links(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawPrCommitLink>>;

    /// The inverse lookup of `fetch_pr_commit_links`, keyed by commit sha
    /// rather than PR id — used by the release miner, which discovers
    /// commits by walking the DAG before it knows which PRs touched them.
    async fn fetch_pr_commit_links_by_sha(
        &self,
        commit_shas: &[String],
    ) -> StorageResult<Vec<RawPrCommitLink>>;

    async fn fetch_labels(&self, pr_ids: &[PrNodeId]) -> StorageResult<Vec<RawLabel>>;
    async fn fetch_tags(&self, repos: &[String]) -> StorageResult<Vec<RawTag>>;
    async fn fetch_branches(&self, repos: &[String]) -> StorageResult<Vec<RawBranch>>;

    /// Check runs starting in `[from, to]`.
    async fn fetch_check_runs_in_window(
        &self,
        repos: &[String],
        pushers: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StorageResult<Vec<RawCheckRun>>;

    /// Check runs for PRs outside the window, so their timelines aren't
    /// truncated (SPEC_FULL §4.4 step 1).
    async fn fetch_check_runs_for_prs(
        &self,
        pr_ids: &[PrNodeId],
    ) -> StorageResult<Vec<RawCheckRun>>;

    async fn fetch_user_logins(
        &self,
        user_ids: &[UserNodeId],
    ) -> StorageResult<HashMap<UserNodeId, String>>;
    async fn fetch_repo_full_names(
        &self,
        node_ids: &[RepoNodeId],
    ) -> StorageResult<HashMap<RepoNodeId, String>>;
}

/// Durable precomputed-facts store: fingerprinted fact cache entries, the
/// commit-history adjacency table, and the PR-facts tables.
#[async_trait]
pub trait PrecomputedStore: Send + Sync {
    async fn get_fact(&self, fingerprint: &str) -> StorageResult<Option<FactCacheEntry>>;
    async fn put_fact(&self, entry: FactCacheEntry) -> StorageResult<()>;

    async fn get_commit_dag(
        &self,
        repository_full_name: &str,
        format_version: u32,
    ) -> StorageResult<Option<CommitDag>>;
    async fn put_commit_dag(&self, dag: CommitDag, format_version: u32) -> StorageResult<()>;

    async fn list_pr_facts(
        &self,
        account: AccountId,
        category: PrFactsCategory,
    ) -> StorageResult<Vec<PrFactsRow>>;
    async fn put_pr_facts(&self, row: PrFactsRow) -> StorageResult<()>;

    /// Targeted label update for the label-sync sub-task (SPEC_FULL §4.6):
    /// overwrites only the `labels` column of the addressed row.
    async fn update_pr_facts_labels(
        &self,
        pr_node_id: PrNodeId,
        release_match: &str,
        format_version: u32,
        labels: HashMap<String, DateTime<Utc>>,
    ) -> StorageResult<()>;
}

/// Append-only event store: deployment events and other persistentdata.
#[async_trait]
pub trait PersistentDataStore: Send + Sync {
    async fn fetch_deployment_events(
        &self,
        repository_full_name: &str,
        commit_shas: &[String],
    ) -> StorageResult<Vec<RawDeploymentEvent>>;
}
