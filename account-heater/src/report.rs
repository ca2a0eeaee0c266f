//! Drives the pipeline across every active account (SPEC_FULL §4.6
//! "batch driver"): one account's failure is logged and recorded, never
//! blocking the rest.

use crate::label_sync::sync_labels;
use crate::notifier::{Event, Notifier};
use crate::pipeline::{heat_account, AccountReport, HeaterStores};
use chrono::{DateTime, Duration, Utc};
use storage_gateway::model::AccountId;
use storage_gateway::RequestContext;
use tracing::{info, warn};

const PR_FACTS_FORMAT_VERSION: u32 = crate::facts_row::PR_FACTS_FORMAT_VERSION;
const HISTORY_WINDOW: Duration = Duration::days(365 * 2);

#[derive(Debug, Default)]
pub struct HeaterSummary {
    pub successful: Vec<AccountId>,
    pub failed: Vec<AccountId>,
    pub reports: Vec<AccountReport>,
}

impl HeaterSummary {
    /// 0 when every account succeeded, 1 if any failed — the heater CLI's
    /// process exit code (SPEC_FULL §6).
    pub fn exit_code(&self) -> i32 {
        if self.failed.is_empty() {
            0
        } else {
            1
        }
    }
}

/// `full_history` mirrors the original's `CI` environment check: under CI
/// the window starts at the Unix epoch instead of two years back, so a
/// fresh test fixture still has PRs to mine.
pub async fn run_heater(
    stores: &HeaterStores,
    notifier: &dyn Notifier,
    full_history: bool,
) -> storage_gateway::StorageResult<HeaterSummary> {
    let now = Utc::now();
    let window_to = now + Duration::days(1);
    let window_from = if full_history {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    } else {
        now - HISTORY_WINDOW
    };

    let accounts = stores.state.list_active_accounts(now).await?;
    info!(count = accounts.len(), "checking progress of active accounts");

    let mut summary = HeaterSummary::default();
    for account in &accounts {
        if account.is_near_expiry(now) {
            if let Err(e) = notifier.notify(Event::AccountAlmostExpired { account: account.id, expires_at: account.expires_at }).await {
                warn!(account = account.id, error = %e, "near-expiry notification failed");
            }
        }
    }

    for account in accounts {
        let ctx = RequestContext::new();
        match heat_account(stores, account.id, window_from, window_to, &ctx).await {
            Ok(report) => {
                match sync_labels(stores.metadata.as_ref(), stores.precomputed.as_ref(), account.id, PR_FACTS_FORMAT_VERSION).await {
                    Ok(updated) => info!(account = account.id, updated, "labels synced"),
                    Err(e) => warn!(account = account.id, error = %e, "label sync failed"),
                }
                info!(
                    account = account.id,
                    releases = report.releases_mined,
                    prs = report.prs_mined,
                    bots = report.bots_created,
                    "account heated"
                );
                if report.repository_sets_newly_precomputed > 0 {
                    let _ = notifier
                        .notify(Event::AccountPrecomputed {
                            account: account.id,
                            releases: report.releases_mined,
                            repositories: report.prs_mined,
                        })
                        .await;
                }
                summary.successful.push(account.id);
                summary.reports.push(report);
            }
            Err(e) => {
                warn!(account = account.id, error = %e, "account heater pass failed");
                summary.failed.push(account.id);
            }
        }
    }

    info!(successful = summary.successful.len(), failed = summary.failed.len(), "heater run complete");
    Ok(summary)
}
