//! Persistence and validate-then-save services for the match backend.
//!
//! [`Store`] abstracts row storage over an in-process [`MemoryStore`] or a
//! [`SqliteStore`]; [`Registry`] runs the serializers and reference checks in
//! front of it.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod memory;
pub mod password;
pub mod registry;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

pub use config::StoreConfig;
pub use error::{RegistryError, StoreError};
pub use memory::MemoryStore;
pub use registry::Registry;
pub use sqlite::SqliteStore;
pub use store::Store;

/// Open the backend selected by `config`.
///
/// # Errors
/// Returns [`StoreError::Config`] for a zero pool size and propagates
/// [`SqliteStore::connect`] failures.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, StoreError> {
    if config.max_connections == 0 {
        return Err(StoreError::Config("max_connections must be at least 1".to_owned()));
    }
    if config.is_memory() {
        tracing::info!("using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::connect(config).await?;
    tracing::info!(url = %config.database_url, "connected to sqlite store");
    Ok(Arc::new(store))
}
