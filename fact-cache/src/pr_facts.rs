//! Durable PR-facts tables: open/merged/done categories keyed by
//! `(pr_node_id, release_match, format_version)`.

use crate::error::FactCacheResult;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use storage_gateway::model::{AccountId, PrFactsCategory, PrFactsRow, PrNodeId};
use storage_gateway::PrecomputedStore;

pub struct PrFactsTables {
    durable: Arc<dyn PrecomputedStore>,
}

impl PrFactsTables {
    pub fn new(durable: Arc<dyn PrecomputedStore>) -> Self {
        Self { durable }
    }

    pub async fn list(
        &self,
        account: AccountId,
        category: PrFactsCategory,
    ) -> FactCacheResult<Vec<PrFactsRow>> {
        Ok(self.durable.list_pr_facts(account, category).await?)
    }

    pub async fn put(&self, row: PrFactsRow) -> FactCacheResult<()> {
        Ok(self.durable.put_pr_facts(row).await?)
    }

    /// Overwrites only the `labels` column of the addressed row, used by
    /// the heater's label-sync sub-task so a pass that only touched labels
    /// never rewrites the rest of a row's (larger) payload.
    pub async fn update_labels(
        &self,
        pr_node_id: PrNodeId,
        release_match: &str,
        format_version: u32,
        labels: HashMap<String, DateTime<Utc>>,
    ) -> FactCacheResult<()> {
        Ok(self
            .durable
            .update_pr_facts_labels(pr_node_id, release_match, format_version, labels)
            .await?)
    }
}
