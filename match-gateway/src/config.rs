//! Gateway settings read from the environment.

use std::net::SocketAddr;

use match_store::StoreConfig;

use crate::error::ConfigError;

pub const LISTEN_ADDR_VAR: &str = "MATCH_LISTEN_ADDR";
pub const DATABASE_URL_VAR: &str = "MATCH_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "MATCH_DB_MAX_CONNECTIONS";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_DATABASE_URL: &str = "sqlite://match.db";

/// Everything `main` needs to start serving.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
}

impl GatewayConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset
    /// variables.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a variable is set but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: LISTEN_ADDR_VAR,
            value: addr.clone(),
            reason: e.to_string(),
        })?;

        let url = lookup(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let mut store = StoreConfig::new(url);

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max = match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: MAX_CONNECTIONS_VAR,
                        value: raw,
                        reason: "expected a positive integer".to_owned(),
                    })
                }
            };
            store = store.with_max_connections(max);
        }

        Ok(Self { listen_addr, store })
    }
}
