//! Resolves tag/branch releases per repository and links PRs to the
//! release that first shipped them.

pub mod cache;
pub mod dag;
pub mod error;
pub mod first_release;
pub mod matching;
pub mod mining;
pub mod model;

pub use cache::mine_releases_cached;
pub use error::{ReleaseMinerError, ReleaseMinerResult};
pub use mining::{mine_releases, ReleaseMiningRequest, FORMAT_VERSION};
pub use model::Release;
