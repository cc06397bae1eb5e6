//! Sadhak clinic persistence layer
//!
//! This crate provides typed access to the clinic's document store: patients,
//! appointments, follow-ups, payments, medicines, treatments and staff
//! profiles, each kept as schemaless JSON documents in a named collection.
//!
//! # Features
//!
//! - **Typed CRUD**: the entity type selects the collection; identifiers and
//!   timestamps are managed by the access layer
//! - **Queries**: equality and range filters, multi-key ordering, limits and
//!   keyset cursors
//! - **Pagination**: opaque cursors with an exact `has_more` flag
//! - **Derived fields**: payment totals and low-stock flags are recomputed on
//!   every write that touches their inputs
//!
//! Available backend features:
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! # Architecture
//!
//! - [`schema`] - Domain entities and named collections
//! - [`types`] - Queries, cursors and pages
//! - [`error`] - Error types for all operations
//! - [`core`] - The store contract and the connection handle
//! - [`config`] - Store configuration
//! - [`access`] - The typed access layer
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```no_run
//! use sadhak_persistence::{DocumentAccess, StoreConfig, StoreConnection};
//! use sadhak_persistence::schema::{Patient, PatientStatus};
//! use sadhak_persistence::types::where_eq;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Missing configuration yields an unconfigured (not failing) connection
//! let connection = StoreConnection::from_config(&StoreConfig::new("clinic.db", "sadhak"))?;
//! let access = DocumentAccess::new(connection);
//!
//! let active = access
//!     .query::<Patient>([where_eq("status", PatientStatus::Active.as_str())])
//!     .await?;
//! for patient in active {
//!     println!("{} ({})", patient.name, patient.id);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod access;
pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod schema;
pub mod types;

// Re-export commonly used types at crate root
pub use access::{DocumentAccess, ProbeReport, cursor_after};
pub use config::StoreConfig;
pub use core::{DocumentStore, StoreConnection};
pub use error::{BackendError, StorageError, StorageResult};
pub use schema::{Collection, Entity, Stored};
pub use types::{Page, PageCursor, QueryConstraint};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
