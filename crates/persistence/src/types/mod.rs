//! Core types for the persistence layer.
//!
//! - [`StoredDocument`] - A raw document as exchanged with a backend
//! - [`QueryConstraint`], [`DocumentQuery`] - Query types
//! - [`PageCursor`], [`Page`] - Pagination types
//!
//! # Pagination
//!
//! ```
//! use sadhak_persistence::types::{CursorValue, PageCursor};
//!
//! let cursor = PageCursor::new(vec![CursorValue::from("2025-01-15")], "doc-id");
//! let encoded = cursor.encode();
//!
//! let decoded = PageCursor::decode(&encoded).unwrap();
//! assert_eq!(decoded.document_id(), "doc-id");
//! ```

mod document;
mod pagination;
mod query;

pub use document::StoredDocument;

pub use pagination::{CursorValue, Page, PageCursor};

pub use query::{
    DocumentQuery, Filter, FilterOp, QueryConstraint, SortDirection, SortKey, limit, order_by,
    start_after, where_eq, where_field,
};
