//! Error types for the persistence layer.
//!
//! Callers only ever see [`StorageError`], whose three variants carry the
//! collection an operation ran against. Lower-level faults raised by a store
//! backend are described by [`BackendError`] and attached as the `source` of a
//! read or write failure.
//!
//! A missing document is not an error: single-document reads return
//! `Ok(None)`.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The error taxonomy surfaced by every access-layer operation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store connection was never established (missing or invalid
    /// configuration). Fatal for the operation, never for the process.
    #[error("document store unavailable for {collection}: {reason}")]
    StoreUnavailable { collection: String, reason: String },

    /// The store failed to complete a read (query, get, count, exists).
    #[error("failed to read from {collection}: {message}")]
    ReadFailure {
        collection: String,
        message: String,
        #[source]
        source: Option<BackendError>,
    },

    /// The store failed to complete a write (create, update, delete).
    #[error("failed to write to {collection}: {message}")]
    WriteFailure {
        collection: String,
        message: String,
        #[source]
        source: Option<BackendError>,
    },
}

impl StorageError {
    /// Builds a [`StorageError::StoreUnavailable`] for `collection`.
    pub fn unavailable(collection: impl AsRef<str>, reason: impl Into<String>) -> Self {
        StorageError::StoreUnavailable {
            collection: collection.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    /// Wraps a backend fault raised while reading `collection`.
    pub fn read(collection: impl AsRef<str>, source: BackendError) -> Self {
        StorageError::ReadFailure {
            collection: collection.as_ref().to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Wraps a backend fault raised while writing `collection`.
    pub fn write(collection: impl AsRef<str>, source: BackendError) -> Self {
        StorageError::WriteFailure {
            collection: collection.as_ref().to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns the collection the failed operation targeted.
    pub fn collection(&self) -> &str {
        match self {
            StorageError::StoreUnavailable { collection, .. }
            | StorageError::ReadFailure { collection, .. }
            | StorageError::WriteFailure { collection, .. } => collection,
        }
    }

    /// Returns true if the failure is due to a missing store connection.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::StoreUnavailable { .. })
    }
}

/// Faults raised by a document-store backend.
///
/// Backends know nothing about which access-layer operation is running, so
/// these carry no collection; [`StorageError`] adds it.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The query could not be built or executed.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// A pagination cursor could not be decoded or does not fit the query.
    #[error("invalid pagination cursor: {cursor}")]
    InvalidCursor { cursor: String },

    /// Update targeted a document that does not exist.
    #[error("no document with id {id}")]
    MissingDocument { id: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for access-layer operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for BackendError {
    fn from(err: tokio::task::JoinError) -> Self {
        BackendError::Internal {
            backend_name: "runtime".to_string(),
            message: format!("blocking task failed: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for BackendError {
    fn from(_err: r2d2::Error) -> Self {
        BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        }
    }
}
