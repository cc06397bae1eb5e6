//! The store connection handle.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::BackendResult;

use super::DocumentStore;

/// A handle to the document store, or the reason there is none.
///
/// Built once from configuration and cloned into every component that needs
/// the store. An unconfigured handle is a normal value: operations through it
/// fail with [`StorageError::StoreUnavailable`](crate::StorageError::StoreUnavailable)
/// instead of the process aborting at startup.
#[derive(Clone)]
pub enum StoreConnection {
    /// A usable store.
    Connected(Arc<dyn DocumentStore>),
    /// No store; `reason` says why.
    Unconfigured {
        /// Human-readable cause, e.g. the missing configuration keys.
        reason: String,
    },
}

impl StoreConnection {
    /// Wraps an already-open store.
    pub fn connected(store: impl DocumentStore + 'static) -> Self {
        StoreConnection::Connected(Arc::new(store))
    }

    /// Creates an unconfigured handle.
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        StoreConnection::Unconfigured {
            reason: reason.into(),
        }
    }

    /// Opens the store named by `config`.
    ///
    /// Missing required keys yield [`StoreConnection::Unconfigured`]; an
    /// error is returned only when a fully configured store cannot be opened.
    pub fn from_config(config: &StoreConfig) -> BackendResult<Self> {
        let missing = config.missing_required();
        if !missing.is_empty() {
            let reason = format!("missing configuration: {}", missing.join(", "));
            warn!(missing = ?missing, "Document store left unconfigured");
            return Ok(Self::unconfigured(reason));
        }

        #[cfg(feature = "sqlite")]
        {
            let store = crate::backends::sqlite::SqliteStore::from_config(config)?;
            info!(
                backend = store.backend_name(),
                project_id = %store.project_id(),
                in_memory = store.is_memory(),
                "Document store connected"
            );
            Ok(Self::connected(store))
        }

        #[cfg(not(feature = "sqlite"))]
        {
            info!("No document store backend compiled in");
            Ok(Self::unconfigured("no document store backend compiled in"))
        }
    }

    /// Returns the store, or the reason there is none.
    pub fn store(&self) -> Result<&Arc<dyn DocumentStore>, &str> {
        match self {
            StoreConnection::Connected(store) => Ok(store),
            StoreConnection::Unconfigured { reason } => Err(reason.as_str()),
        }
    }

    /// Returns true if a store is available.
    pub fn is_connected(&self) -> bool {
        matches!(self, StoreConnection::Connected(_))
    }
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConnection::Connected(store) => f
                .debug_tuple("Connected")
                .field(&store.backend_name())
                .finish(),
            StoreConnection::Unconfigured { reason } => f
                .debug_struct("Unconfigured")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_unconfigured() {
        let conn = StoreConnection::from_config(&StoreConfig::default()).unwrap();
        assert!(!conn.is_connected());
        let reason = conn.store().unwrap_err();
        assert!(reason.contains("database_url"));
        assert!(reason.contains("project_id"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_in_memory_config_connects() {
        let conn = StoreConnection::from_config(&StoreConfig::in_memory("sadhak")).unwrap();
        assert!(conn.is_connected());
        assert!(format!("{conn:?}").contains("sqlite"));
    }
}
