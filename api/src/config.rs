//! The API binary's own `Config::from_env()` (SPEC_FULL §6), following the
//! same fail-fast-on-missing-variable convention as
//! `storage_gateway::StorageConfig`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidEnv(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        if bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidEnv("API_BIND_ADDR", bind_addr));
        }
        Ok(Self { bind_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_addr_when_unset() {
        // SAFETY: test runs single-threaded w.r.t. this key; no other test touches it.
        unsafe {
            std::env::remove_var("API_BIND_ADDR");
        }
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn rejects_unparseable_bind_addr() {
        unsafe {
            std::env::set_var("API_BIND_ADDR", "not-an-addr");
        }
        let err = ApiConfig::from_env().unwrap_err();
        unsafe {
            std::env::remove_var("API_BIND_ADDR");
        }
        assert!(matches!(err, ConfigError::InvalidEnv("API_BIND_ADDR", _)));
    }
}
