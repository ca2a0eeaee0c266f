//! Assembles per-PR timelines from scattered event records and derives
//! canonical lifecycle timestamps feeding the metrics.

pub mod cache;
pub mod error;
pub mod jira;
pub mod mining;
pub mod model;

pub use cache::mine_pull_requests_cached;
pub use error::{PrMinerError, PrMinerResult};
pub use mining::{mine_pull_requests, MiningRequest};
pub use model::{LabelFilter, ParticipantFilter, ParticipantRole, PrBundle, PrFacts};
