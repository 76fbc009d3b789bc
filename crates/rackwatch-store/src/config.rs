//! Store configuration.
//!
//! The endpoint and credential arrive out-of-band as environment
//! variables, matching how the hosting platform injects them. A missing
//! value is a fatal [`StoreError::Config`]: the sweep never starts.

use crate::error::{StoreError, StoreResult};

/// Environment variable holding the store endpoint URL.
pub const ENV_STORE_URL: &str = "RACKWATCH_STORE_URL";
/// Environment variable holding the service credential.
pub const ENV_SERVICE_KEY: &str = "RACKWATCH_SERVICE_KEY";

/// Endpoint + credential for the hosted inventory store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store, e.g. `https://xyz.example.co`.
    pub endpoint: String,
    /// Privileged service key (server-side triggers) or anon key (UI).
    pub service_key: String,
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            service_key: service_key.into(),
        }
    }

    /// Load from `RACKWATCH_STORE_URL` / `RACKWATCH_SERVICE_KEY`.
    pub fn from_env() -> StoreResult<Self> {
        let endpoint = read_var(ENV_STORE_URL)?;
        let service_key = read_var(ENV_SERVICE_KEY)?;
        Ok(Self {
            endpoint,
            service_key,
        })
    }
}

fn read_var(name: &str) -> StoreResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(StoreError::Config(format!(
            "missing store credentials: {name} is not set"
        ))),
    }
}
