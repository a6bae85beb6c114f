use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LOCK_TIMEOUT_ENV: &str = "LEDGER_LOCK_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Longest wait for exclusive access to an account before an operation fails.
    pub lock_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value `{value}` for {var}, expected milliseconds")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl LedgerConfig {
    /// Defaults overridden by `LEDGER_LOCK_TIMEOUT_MS`, when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(LOCK_TIMEOUT_ENV) {
            let millis = value.trim().parse::<u64>().map_err(|_| ConfigError {
                var: LOCK_TIMEOUT_ENV,
                value: value.clone(),
            })?;
            config.lock_timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }
}
