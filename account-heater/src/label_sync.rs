//! Label-sync sub-task (SPEC_FULL §4.6): walks every stored PR-facts row,
//! compares its `labels` mapping against the metadata store's current
//! labels (case-folded), and issues a targeted update only where they
//! differ. Chunked at ~1000 rows per batch to bound in-flight fan-out, the
//! same chunking shape `sync_labels` uses for its per-account-id GitHub
//! label queries.

use crate::error::HeaterResult;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use storage_gateway::model::{AccountId, PrFactsCategory, PrNodeId, RawLabel};
use storage_gateway::{MetadataStore, PrecomputedStore};

const BATCH_SIZE: usize = 1000;

pub async fn sync_labels(
    metadata: &dyn MetadataStore,
    precomputed: &dyn PrecomputedStore,
    account: AccountId,
    format_version: u32,
) -> HeaterResult<usize> {
    let mut rows = Vec::new();
    for category in [PrFactsCategory::Open, PrFactsCategory::Merged, PrFactsCategory::Done] {
        rows.extend(precomputed.list_pr_facts(account, category).await?);
    }

    let mut updated = 0;
    for chunk in rows.chunks(BATCH_SIZE) {
        let pr_ids: Vec<PrNodeId> = chunk.iter().map(|r| r.pr_node_id).collect();
        let labels = metadata.fetch_labels(&pr_ids).await?;
        for row in chunk {
            let row_labels: Vec<&RawLabel> = labels.iter().filter(|l| l.pr_node_id == row.pr_node_id).collect();
            let current = current_labels(&row_labels, &row.labels);
            if !same_keys(&current, &row.labels) {
                precomputed
                    .update_pr_facts_labels(row.pr_node_id, &row.release_match, format_version, current)
                    .await?;
                updated += 1;
            }
        }
    }
    Ok(updated)
}

fn current_labels(
    labels: &[&RawLabel],
    existing: &HashMap<String, DateTime<Utc>>,
) -> HashMap<String, DateTime<Utc>> {
    let now = Utc::now();
    labels
        .iter()
        .map(|l| {
            let key = l.name.to_lowercase();
            let applied_at = existing.get(&key).copied().unwrap_or(now);
            (key, applied_at)
        })
        .collect()
}

fn same_keys(a: &HashMap<String, DateTime<Utc>>, b: &HashMap<String, DateTime<Utc>>) -> bool {
    let a_keys: HashSet<&String> = a.keys().collect();
    let b_keys: HashSet<&String> = b.keys().collect();
    a_keys == b_keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_gateway::mock::{InMemoryMetadataStore, InMemoryPrecomputedStore};
    use storage_gateway::model::PrFactsRow;

    #[tokio::test]
    async fn updates_only_rows_whose_labels_changed() {
        let metadata = InMemoryMetadataStore::new();
        metadata.seed_labels(1, vec![RawLabel { pr_node_id: 1, name: "Bug".into() }]);
        let precomputed = InMemoryPrecomputedStore::new();
        precomputed
            .put_pr_facts(PrFactsRow {
                pr_node_id: 1,
                release_match: "branch|main".into(),
                format_version: 1,
                category: PrFactsCategory::Done,
                payload: vec![],
                labels: HashMap::new(),
                activity_days: vec![],
                authors: HashMap::new(),
                reviewers: HashMap::new(),
                commenters: HashMap::new(),
                commit_authors: HashMap::new(),
            })
            .await
            .unwrap();

        let updated = sync_labels(&metadata, &precomputed, 1, 1).await.unwrap();
        assert_eq!(updated, 1);

        let rows = precomputed.list_pr_facts(1, PrFactsCategory::Done).await.unwrap();
        assert!(rows[0].labels.contains_key("bug"));

        let updated_again = sync_labels(&metadata, &precomputed, 1, 1).await.unwrap();
        assert_eq!(updated_again, 0);
    }
}
