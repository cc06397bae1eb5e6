//! The document-store contract.
//!
//! A [`DocumentStore`] keeps schemaless JSON documents in named collections.
//! It knows nothing about entities: the access layer serializes entities into
//! field maps, stamps timestamps and assigns identifiers before handing them
//! to the store.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::schema::FieldMap;
use crate::types::{DocumentQuery, StoredDocument};

/// Hook run by [`DocumentStore::merge_with`] on the merged fields, inside the
/// same write as the merge.
pub type Recompute = Box<dyn FnOnce(&mut FieldMap) -> BackendResult<()> + Send>;

/// Storage operations over named collections of JSON documents.
///
/// # Example
///
/// ```ignore
/// use sadhak_persistence::core::DocumentStore;
///
/// async fn copy_all(from: &dyn DocumentStore, to: &dyn DocumentStore) {
///     for doc in from.list("patients").await.unwrap() {
///         to.insert("patients", &doc.id, doc.fields).await.unwrap();
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Stores a new document under `id`.
    ///
    /// # Errors
    ///
    /// Fails if a document with the same id already exists in the collection.
    async fn insert(&self, collection: &str, id: &str, fields: FieldMap) -> BackendResult<()>;

    /// Reads a document's fields, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<FieldMap>>;

    /// Reads every document of a collection, in no particular order.
    async fn list(&self, collection: &str) -> BackendResult<Vec<StoredDocument>>;

    /// Runs a compiled query.
    ///
    /// Results are ordered by the query's sort keys, then by id ascending.
    /// Filters only match values of the same JSON type as the filter value,
    /// and sort keys exclude documents lacking the field.
    async fn query(&self, collection: &str, query: &DocumentQuery)
    -> BackendResult<Vec<StoredDocument>>;

    /// Merges `fields` into an existing document, top-level key by key.
    ///
    /// Returns `false` without writing if the document does not exist.
    async fn merge(&self, collection: &str, id: &str, fields: FieldMap) -> BackendResult<bool> {
        self.merge_with(collection, id, fields, Box::new(|_: &mut FieldMap| Ok(())))
            .await
    }

    /// Merges `fields` into an existing document, then runs `recompute` on
    /// the merged fields before writing them.
    ///
    /// Reading the current document, merging, recomputing and writing are
    /// atomic with respect to other writes of the same document. If
    /// `recompute` fails nothing is written.
    async fn merge_with(
        &self,
        collection: &str,
        id: &str,
        fields: FieldMap,
        recompute: Recompute,
    ) -> BackendResult<bool>;

    /// Removes a document. Removing an absent document succeeds.
    async fn remove(&self, collection: &str, id: &str) -> BackendResult<()>;

    /// Checks whether a document exists.
    ///
    /// The default implementation reads the document.
    async fn exists(&self, collection: &str, id: &str) -> BackendResult<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }

    /// Counts the documents of a collection.
    ///
    /// The default implementation materializes every document and is
    /// proportional to the collection size; backends with a native count
    /// should override it.
    async fn count(&self, collection: &str) -> BackendResult<u64> {
        Ok(self.list(collection).await?.len() as u64)
    }
}
