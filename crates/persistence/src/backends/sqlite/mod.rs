//! SQLite backend implementation.
//!
//! Supports in-memory databases (tests, throwaway runs) and file-based
//! databases.
//!
//! # Example
//!
//! ```no_run
//! use sadhak_persistence::backends::sqlite::SqliteStore;
//! use sadhak_persistence::core::StoreConnection;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("clinic.db", "sadhak-ayurved")?;
//! let connection = StoreConnection::connected(store);
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE documents (
//!     project_id TEXT NOT NULL,
//!     collection TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     data TEXT NOT NULL,  -- JSON object
//!     created_at TEXT,
//!     updated_at TEXT,
//!     PRIMARY KEY (project_id, collection, id)
//! );
//! ```

mod backend;
mod query_builder;
mod schema;
mod store;

pub use backend::{SqliteStore, SqliteStoreConfig};
