//! Heater-completion and near-expiry announcements. The original posts to
//! Slack; that client is out of scope here (DESIGN.md Open Question #4), so
//! this is just the trait shape plus a no-op implementation a production
//! deployment can swap out without touching heater logic.

use chrono::{DateTime, Utc};
use storage_gateway::model::AccountId;

#[derive(Debug, Clone)]
pub enum Event {
    AccountPrecomputed {
        account: AccountId,
        releases: usize,
        repositories: usize,
    },
    AccountAlmostExpired {
        account: AccountId,
        expires_at: DateTime<Utc>,
    },
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: Event) -> Result<(), String>;
}

pub struct NullNotifier;

#[async_trait::async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: Event) -> Result<(), String> {
        Ok(())
    }
}
