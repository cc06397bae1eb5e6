//! SQLite document store.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::config::{DatabaseLocation, StoreConfig};
use crate::error::{BackendError, BackendResult};

use super::schema;

pub(crate) const BACKEND_NAME: &str = "sqlite";

/// SQLite backend storing documents as JSON text.
///
/// Every document lives in one `documents` table keyed by
/// `(project_id, collection, id)`; the project id is fixed per store.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    project_id: String,
    is_memory: bool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("project_id", &self.project_id)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

/// Tuning for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
        }
    }
}

impl SqliteStore {
    /// Creates a new in-memory store with an initialized schema.
    pub fn in_memory(project_id: impl Into<String>) -> BackendResult<Self> {
        Self::with_config(
            DatabaseLocation::Memory,
            project_id,
            SqliteStoreConfig::default(),
        )
    }

    /// Opens or creates a database file and initializes its schema.
    pub fn open<P: AsRef<Path>>(path: P, project_id: impl Into<String>) -> BackendResult<Self> {
        Self::with_config(
            DatabaseLocation::File(path.as_ref().to_path_buf()),
            project_id,
            SqliteStoreConfig::default(),
        )
    }

    /// Opens the store described by a complete [`StoreConfig`].
    pub fn from_config(config: &StoreConfig) -> BackendResult<Self> {
        let (Some(location), Some(project_id)) = (config.location(), config.project_id.clone())
        else {
            return Err(BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: format!(
                    "missing configuration: {}",
                    config.missing_required().join(", ")
                ),
            });
        };
        Self::with_config(location, project_id, config.sqlite.clone())
    }

    /// Creates a store with custom configuration.
    ///
    /// Each in-memory connection is a separate database, so an in-memory
    /// store keeps exactly one connection open for its whole lifetime.
    pub fn with_config(
        location: DatabaseLocation,
        project_id: impl Into<String>,
        config: SqliteStoreConfig,
    ) -> BackendResult<Self> {
        let is_memory = location == DatabaseLocation::Memory;

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms as u64);
        let enable_wal = config.enable_wal && !is_memory;
        let manager = match &location {
            DatabaseLocation::Memory => SqliteConnectionManager::memory(),
            DatabaseLocation::File(path) => SqliteConnectionManager::file(path),
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if enable_wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
            }
            Ok(())
        });

        let builder = Pool::builder().connection_timeout(Duration::from_millis(
            config.connection_timeout_ms,
        ));
        let builder = if is_memory {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder
                .max_size(config.max_connections)
                .min_idle(Some(config.min_connections))
        };

        let pool = builder
            .build(manager)
            .map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("{}: {}", location, e),
            })?;

        let store = Self {
            pool,
            config,
            project_id: project_id.into(),
            is_memory,
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Initialize the database schema.
    pub fn init_schema(&self) -> BackendResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(&self) -> BackendResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| BackendError::ConnectionFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns a handle to the pool for use on a blocking thread.
    pub(crate) fn pool(&self) -> Pool<SqliteConnectionManager> {
        self.pool.clone()
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the project this store reads and writes.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }
}
