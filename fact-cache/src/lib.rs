//! Short-lived process-local cache plus a durable precomputed-facts store
//! keyed by content fingerprints; tracks hit/miss counters per topic.

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod local_cache;
pub mod pr_facts;

/// Current on-disk payload format. Bump whenever a miner changes the shape
/// of the bytes it caches; every existing entry becomes a miss on the next
/// read and is rebuilt transparently.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

pub use cache::FactCache;
pub use error::{FactCacheError, FactCacheResult};
pub use fingerprint::{compute as compute_fingerprint, FingerprintInput};
pub use pr_facts::PrFactsTables;
