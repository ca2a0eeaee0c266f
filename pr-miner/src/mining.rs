//! The PR mining pipeline (SPEC_FULL §4.2).

use crate::error::PrMinerResult;
use crate::jira;
use crate::model::{
    LabelFilter, ParticipantFilter, ParticipantRole, PrBundle, PrFacts, PrParticipants, PrSize,
    PrTimestamps,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use storage_gateway::model::{PrNodeId, RawPullRequest, ReviewState};
use storage_gateway::MetadataStore;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct MiningRequest<'a> {
    pub repositories: &'a [String],
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
    pub participants: &'a ParticipantFilter,
    pub labels: &'a LabelFilter,
    pub blacklist: &'a HashSet<PrNodeId>,
    /// Published-at timestamps for PRs already linked to a release by the
    /// release miner (SPEC_FULL §4.3); absent entries mean "not released".
    pub released_at: &'a HashMap<PrNodeId, DateTime<Utc>>,
    pub exclude_inactive: bool,
}

/// Runs the full pipeline and returns one bundle per surviving PR.
#[instrument(level = "info", skip_all, fields(repos = request.repositories.len()))]
pub async fn mine_pull_requests(
    metadata: &dyn MetadataStore,
    request: MiningRequest<'_>,
) -> PrMinerResult<Vec<PrBundle>> {
    let candidates = metadata
        .fetch_prs_in_window(request.repositories, request.window_from, request.window_to)
        .await?;
    let candidates: Vec<RawPullRequest> = candidates
        .into_iter()
        .filter(|pr| !request.blacklist.contains(&pr.node_id))
        .collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let pr_ids: Vec<PrNodeId> = candidates.iter().map(|pr| pr.node_id).collect();
    let reviews = metadata.fetch_reviews(&pr_ids).await?;
    let review_requests = metadata.fetch_review_requests(&pr_ids).await?;
    let comments = metadata.fetch_comments(&pr_ids).await?;
    let pr_commit_links = metadata.fetch_pr_commit_links(&pr_ids).await?;
    let labels = metadata.fetch_labels(&pr_ids).await?;

    let commit_shas: Vec<String> = pr_commit_links.iter().map(|l| l.commit_sha.clone()).collect();
    let commits = metadata.fetch_commits(&commit_shas).await?;
    let commits_by_sha: HashMap<&str, &storage_gateway::model::RawCommit> =
        commits.iter().map(|c| (c.sha.as_str(), c)).collect();

    let mut bundles = Vec::with_capacity(candidates.len());
    for pr in candidates {
        let pr_reviews: Vec<_> = reviews.iter().filter(|r| r.pr_node_id == pr.node_id).cloned().collect();
        let pr_review_requests: Vec<_> = review_requests
            .iter()
            .filter(|r| r.pr_node_id == pr.node_id)
            .cloned()
            .collect();
        let pr_comments: Vec<_> = comments.iter().filter(|c| c.pr_node_id == pr.node_id).cloned().collect();
        let pr_commits: Vec<_> = pr_commit_links
            .iter()
            .filter(|l| l.pr_node_id == pr.node_id)
            .filter_map(|l| commits_by_sha.get(l.commit_sha.as_str()).map(|c| (*c).clone()))
            .collect();
        let pr_labels: Vec<_> = labels.iter().filter(|l| l.pr_node_id == pr.node_id).cloned().collect();

        if !request.participants.is_empty()
            && !passes_participant_filter(
                &pr,
                &pr_reviews,
                &pr_comments,
                &pr_commits,
                request.participants,
            )
        {
            continue;
        }

        let label_set: HashSet<String> = pr_labels.iter().map(|l| l.name.clone()).collect();
        if !request.labels.matches(&label_set) {
            continue;
        }

        let released = request.released_at.get(&pr.node_id).copied();
        let facts = compute_facts(&pr, &pr_reviews, &pr_review_requests, &pr_comments, &pr_commits, &label_set, released);

        if request.exclude_inactive && !has_activity_in_window(&pr, &pr_reviews, &pr_comments, &pr_commits, request.window_from, request.window_to) {
            continue;
        }

        bundles.push(PrBundle {
            pr,
            reviews: pr_reviews,
            review_requests: pr_review_requests,
            comments: pr_comments,
            commits: pr_commits,
            labels: pr_labels,
            facts,
        });
    }

    Ok(bundles)
}

fn passes_participant_filter(
    pr: &RawPullRequest,
    reviews: &[storage_gateway::model::RawReview],
    comments: &[storage_gateway::model::RawComment],
    commits: &[storage_gateway::model::RawCommit],
    filter: &ParticipantFilter,
) -> bool {
    let check = |role: ParticipantRole, present: &dyn Fn(&HashSet<i64>) -> bool| -> bool {
        filter.by_role.get(&role).map(present).unwrap_or(false)
    };

    check(ParticipantRole::Author, &|set| pr.author.map(|a| set.contains(&a)).unwrap_or(false))
        || check(ParticipantRole::Merger, &|set| pr.merged_by.map(|m| set.contains(&m)).unwrap_or(false))
        || check(ParticipantRole::Reviewer, &|set| reviews.iter().any(|r| set.contains(&r.author)))
        || check(ParticipantRole::Commenter, &|set| comments.iter().any(|c| set.contains(&c.author)))
        || check(ParticipantRole::CommitAuthor, &|set| {
            commits.iter().any(|c| c.author.map(|a| set.contains(&a)).unwrap_or(false))
        })
        || check(ParticipantRole::CommitCommitter, &|set| {
            commits.iter().any(|c| c.committer.map(|a| set.contains(&a)).unwrap_or(false))
        })
}

fn has_activity_in_window(
    pr: &RawPullRequest,
    reviews: &[storage_gateway::model::RawReview],
    comments: &[storage_gateway::model::RawComment],
    commits: &[storage_gateway::model::RawCommit],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> bool {
    let in_window = |t: DateTime<Utc>| t >= from && t <= to;
    in_window(pr.created_at)
        || pr.closed_at.map(in_window).unwrap_or(false)
        || pr.merged_at.map(in_window).unwrap_or(false)
        || reviews.iter().any(|r| in_window(r.submitted_at))
        || comments.iter().any(|c| in_window(c.created_at))
        || commits.iter().any(|c| in_window(c.authored_at))
}

fn compute_facts(
    pr: &RawPullRequest,
    reviews: &[storage_gateway::model::RawReview],
    review_requests: &[storage_gateway::model::RawReviewRequest],
    comments: &[storage_gateway::model::RawComment],
    commits: &[storage_gateway::model::RawCommit],
    labels: &HashSet<String>,
    released: Option<DateTime<Utc>>,
) -> PrFacts {
    let created = pr.created_at;
    let first_commit = commits.iter().map(|c| c.authored_at).min();
    let work_began = Some(match first_commit {
        Some(fc) => created.min(fc),
        None => created,
    });
    let first_review_request = review_requests.iter().map(|r| r.created_at).min();
    let last_commit_before_first_review = first_review_request.and_then(|frr| {
        commits.iter().map(|c| c.authored_at).filter(|t| *t <= frr).max()
    });
    let first_comment_on_first_review = first_review_request.and_then(|frr| {
        comments
            .iter()
            .filter(|c| c.is_review_comment && c.created_at >= frr)
            .map(|c| c.created_at)
            .min()
    });
    let last_review = reviews.iter().map(|r| r.submitted_at).max();
    let approved = reviews
        .iter()
        .filter(|r| r.state == ReviewState::Approved)
        .map(|r| r.submitted_at)
        .max();

    let timestamps = PrTimestamps {
        created: Some(created),
        work_began,
        first_commit,
        last_commit_before_first_review,
        first_review_request,
        first_comment_on_first_review,
        approved,
        last_review,
        merged: pr.merged_at,
        closed: pr.closed_at,
        released,
    };

    let mut jira_links = jira::extract(&pr.title);
    if let Some(body) = &pr.body {
        jira_links.extend(jira::extract(body));
    }
    jira_links.extend(jira::extract_all(commits.iter().map(|c| c.message.as_str())));

    PrFacts {
        pr_node_id: pr.node_id,
        repository_full_name: pr.repository_full_name.clone(),
        number: pr.number,
        timestamps,
        size: PrSize {
            additions: pr.additions,
            deletions: pr.deletions,
            files_changed: pr.changed_files,
        },
        participants: PrParticipants {
            author: pr.author,
            merger: pr.merged_by,
            reviewers: reviews.iter().map(|r| r.author).collect(),
            commenters: comments.iter().map(|c| c.author).collect(),
            commit_authors: commits.iter().filter_map(|c| c.author).collect(),
            commit_committers: commits.iter().filter_map(|c| c.committer).collect(),
        },
        labels: labels.clone(),
        jira_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage_gateway::mock::InMemoryMetadataStore;

    fn t(offset_hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(offset_hours)
    }

    fn seed_single_pr(store: &InMemoryMetadataStore) {
        store.seed_pr(RawPullRequest {
            node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 42,
            author: Some(100),
            merged_by: Some(100),
            created_at: t(0),
            closed_at: Some(t(3)),
            merged_at: Some(t(3)),
            additions: 10,
            deletions: 2,
            changed_files: 3,
            merge_commit_sha: Some("deadbeef".into()),
            title: "Fix PROJ-1".into(),
            body: None,
        });
        store.seed_review_requests(1, vec![storage_gateway::model::RawReviewRequest {
            pr_node_id: 1,
            requested_reviewer: 200,
            created_at: t(1),
        }]);
        store.seed_reviews(1, vec![storage_gateway::model::RawReview {
            pr_node_id: 1,
            author: 200,
            state: ReviewState::Approved,
            submitted_at: t(2),
        }]);
    }

    #[tokio::test]
    async fn single_pr_window_yields_expected_lifecycle_timestamps() {
        let store = InMemoryMetadataStore::new();
        seed_single_pr(&store);

        let request = MiningRequest {
            repositories: &["org/repo".to_string()],
            window_from: t(-24),
            window_to: t(24),
            participants: &ParticipantFilter::default(),
            labels: &LabelFilter::default(),
            blacklist: &HashSet::new(),
            released_at: &HashMap::new(),
            exclude_inactive: false,
        };

        let bundles = mine_pull_requests(&store, request).await.unwrap();
        assert_eq!(bundles.len(), 1);
        let facts = &bundles[0].facts;
        assert_eq!(facts.timestamps.created, Some(t(0)));
        assert_eq!(facts.timestamps.first_review_request, Some(t(1)));
        assert_eq!(facts.timestamps.approved, Some(t(2)));
        assert_eq!(facts.timestamps.merged, Some(t(3)));
        assert!(facts.timestamps.satisfies_invariants());
        assert!(facts.jira_links.contains("PROJ-1"));
    }

    #[tokio::test]
    async fn blacklisted_pr_is_excluded() {
        let store = InMemoryMetadataStore::new();
        seed_single_pr(&store);
        let request = MiningRequest {
            repositories: &["org/repo".to_string()],
            window_from: t(-24),
            window_to: t(24),
            participants: &ParticipantFilter::default(),
            labels: &LabelFilter::default(),
            blacklist: &HashSet::from([1]),
            released_at: &HashMap::new(),
            exclude_inactive: false,
        };
        let bundles = mine_pull_requests(&store, request).await.unwrap();
        assert!(bundles.is_empty());
    }
}
