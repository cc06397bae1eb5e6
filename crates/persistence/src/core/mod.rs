//! Core storage abstractions.
//!
//! - [`DocumentStore`] - Backend contract over named collections of JSON documents
//! - [`StoreConnection`] - The explicit connection handle injected into the access layer
//! - [`WriteClock`] - Strictly increasing write timestamps
//!
//! ```text
//! DocumentAccess ──> StoreConnection ──> Arc<dyn DocumentStore>
//!                                            └── SqliteStore
//! ```

mod clock;
mod connection;
mod store;

pub use clock::WriteClock;
pub use connection::StoreConnection;
pub use store::{DocumentStore, Recompute};
