//! Uniform access to the four logical stores (state, metadata, precomputed,
//! persistentdata) with retry-on-transient-error and per-query latency
//! accounting. This is the leaf dependency of every other crate in the
//! workspace: it owns the raw entity shapes and the store interfaces;
//! derived facts live in the miner crates that consume them.

pub mod config;
pub mod context;
pub mod error;
pub mod mock;
pub mod model;
pub mod retry;
pub mod stores;

pub use config::{ConfigError, StorageConfig};
pub use context::RequestContext;
pub use error::{StorageError, StorageResult};
pub use retry::{with_retry, RETRY_SCHEDULE_MS};
pub use stores::{MetadataStore, PersistentDataStore, PrecomputedStore, StateStore};
