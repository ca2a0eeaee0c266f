//! Connection configuration for the four logical stores.
//!
//! Follows the project's `Config::from_env()` convention: one struct per
//! subsystem, populated from environment variables, validated eagerly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Connection strings for the four stores the heater CLI requires
/// (SPEC_FULL §6): metadata, precomputed, state, persistentdata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_db_dsn: String,
    pub metadata_db_dsn: String,
    pub precomputed_db_dsn: String,
    pub persistentdata_db_dsn: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            state_db_dsn: require_env("STATE_DB_DSN")?,
            metadata_db_dsn: require_env("METADATA_DB_DSN")?,
            precomputed_db_dsn: require_env("PRECOMPUTED_DB_DSN")?,
            persistentdata_db_dsn: require_env("PERSISTENTDATA_DB_DSN")?,
        })
    }

    /// Builds a config directly from already-parsed values (used by the
    /// heater CLI, whose flags are parsed by `clap` rather than read back
    /// out of the environment a second time).
    pub fn from_dsns(
        state_db_dsn: String,
        metadata_db_dsn: String,
        precomputed_db_dsn: String,
        persistentdata_db_dsn: String,
    ) -> Self {
        Self {
            state_db_dsn,
            metadata_db_dsn,
            precomputed_db_dsn,
            persistentdata_db_dsn,
        }
    }
}

fn require_env(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnv(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_names_the_key() {
        // SAFETY: test runs single-threaded w.r.t. this key; no other test touches it.
        unsafe {
            std::env::remove_var("STATE_DB_DSN_TEST_MISSING");
        }
        let err = require_env("STATE_DB_DSN_TEST_MISSING").unwrap_err();
        match err {
            ConfigError::MissingEnv(k) => assert_eq!(k, "STATE_DB_DSN_TEST_MISSING"),
        }
    }
}
