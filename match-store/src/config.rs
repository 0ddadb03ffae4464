//! Store connection settings.

use serde::{Deserialize, Serialize};

/// `database_url` value selecting the in-process [`MemoryStore`](crate::MemoryStore).
pub const MEMORY_URL: &str = "memory";

/// Default pool size for the SQLite backend.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which backend to open and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct StoreConfig {
    /// `memory`, or a SQLite URL such as `sqlite://match.db` or
    /// `sqlite::memory:`.
    pub database_url: String,

    /// Upper bound on pooled SQLite connections. Ignored for in-memory
    /// databases, which always use a single connection.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Config for `database_url` with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Overrides the pool size.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Config for the in-process memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MEMORY_URL)
    }

    /// Whether this selects the in-process memory store.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.database_url == MEMORY_URL
    }

    /// Whether this is a SQLite database that lives only in memory.
    #[must_use]
    pub fn is_sqlite_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
