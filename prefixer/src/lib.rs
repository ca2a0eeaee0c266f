//! Loads per-account identity maps and release-match rules, and produces
//! stable release fingerprints per repository.

pub mod error;
pub mod identity;
pub mod release_settings;

pub use error::{PrefixerError, PrefixerResult};
pub use identity::Prefixer;
pub use release_settings::{compile_all, CompiledReleaseSettings};
