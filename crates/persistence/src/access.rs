//! The typed document-access layer.
//!
//! [`DocumentAccess`] is the single entry point callers use to read and write
//! clinic data. The entity type parameter selects the collection; the layer
//! assigns identifiers, stamps `createdAt` / `updatedAt`, recomputes derived
//! fields and maps backend faults into [`StorageError`]s carrying the
//! collection name.
//!
//! ```
//! use sadhak_persistence::{DocumentAccess, StoreConnection};
//! use sadhak_persistence::backends::sqlite::SqliteStore;
//! use sadhak_persistence::schema::{Medicine, MedicinePatch};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let access = DocumentAccess::new(StoreConnection::connected(SqliteStore::in_memory("demo")?));
//!
//! let id = access.create(&Medicine::new("Triphala Churna", "Churna", 40, "₹120")).await?;
//! access
//!     .update::<Medicine>(&id, &MedicinePatch { stock: Some(9), ..Default::default() })
//!     .await?;
//!
//! let medicine = access.get_by_id::<Medicine>(&id).await?.unwrap();
//! assert!(medicine.low_stock);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{DocumentStore, Recompute, StoreConnection, WriteClock};
use crate::error::{BackendError, BackendResult, StorageError, StorageResult};
use crate::schema::{
    CREATED_AT, Collection, Entity, FieldMap, ID, Stored, UPDATED_AT, timestamp, to_field_map,
};
use crate::types::{DocumentQuery, Page, PageCursor, QueryConstraint, SortKey, StoredDocument};

/// Namespace the connection self-test writes into.
pub const PROBE_COLLECTION: &str = "_connection_test";

/// Outcome of [`DocumentAccess::probe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// A document could be written.
    pub can_write: bool,
    /// The probe namespace could be read back.
    pub can_read: bool,
    /// Documents seen in the probe namespace.
    pub documents_found: u64,
    /// First failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Typed CRUD, query and pagination over the clinic's collections.
///
/// Cheap to clone; clones share the connection and the write clock.
#[derive(Debug, Clone)]
pub struct DocumentAccess {
    connection: StoreConnection,
    clock: Arc<WriteClock>,
}

impl DocumentAccess {
    /// Creates an access layer over `connection`.
    pub fn new(connection: StoreConnection) -> Self {
        Self {
            connection,
            clock: Arc::new(WriteClock::new()),
        }
    }

    /// Returns the underlying connection handle.
    pub fn connection(&self) -> &StoreConnection {
        &self.connection
    }

    fn store(&self, collection: &str) -> StorageResult<&Arc<dyn DocumentStore>> {
        self.connection.store().map_err(|reason| {
            warn!(collection, reason, "Document store unavailable");
            StorageError::unavailable(collection, reason)
        })
    }

    /// Creates a document and returns its new identifier.
    ///
    /// Derived fields are recomputed from their inputs and `createdAt` /
    /// `updatedAt` are both set to the same instant.
    pub async fn create<E: Entity>(&self, data: &E) -> StorageResult<String> {
        let collection = E::COLLECTION.as_str();
        let store = self.store(collection)?;

        let mut entity = data.clone();
        entity.derive();
        let mut fields = to_field_map(&entity).map_err(|e| write_failed(collection, "create", e))?;
        fields.remove(ID);

        let now = Value::String(timestamp::format(&self.clock.now()));
        fields.insert(CREATED_AT.to_string(), now.clone());
        fields.insert(UPDATED_AT.to_string(), now);

        let id = Uuid::new_v4().simple().to_string();
        store
            .insert(collection, &id, fields)
            .await
            .map_err(|e| write_failed(collection, "create", e))?;

        debug!(collection, id = %id, "Created document");
        Ok(id)
    }

    /// Reads one entity, or `None` if no document has this id.
    pub async fn get_by_id<E: Entity>(&self, id: &str) -> StorageResult<Option<Stored<E>>> {
        let collection = E::COLLECTION.as_str();
        let store = self.store(collection)?;

        let fields = store
            .get(collection, id)
            .await
            .map_err(|e| read_failed(collection, "get", e))?;

        match fields {
            Some(fields) => {
                let stored = Stored::from_fields(id, fields)
                    .map_err(|e| read_failed(collection, "get", e))?;
                debug!(collection, id, "Read document");
                Ok(Some(stored))
            }
            None => {
                debug!(collection, id, "Document not found");
                Ok(None)
            }
        }
    }

    /// Reads every entity of the collection, in no particular order.
    pub async fn get_all<E: Entity>(&self) -> StorageResult<Vec<Stored<E>>> {
        let collection = E::COLLECTION.as_str();
        let store = self.store(collection)?;

        let documents = store
            .list(collection)
            .await
            .map_err(|e| read_failed(collection, "list", e))?;
        let items = decode_all(collection, "list", documents)?;

        debug!(collection, count = items.len(), "Listed documents");
        Ok(items)
    }

    /// Runs a query built from constraints that compose with logical AND.
    pub async fn query<E: Entity>(
        &self,
        constraints: impl IntoIterator<Item = QueryConstraint>,
    ) -> StorageResult<Vec<Stored<E>>> {
        let collection = E::COLLECTION.as_str();
        let documents = self.query_documents(E::COLLECTION, constraints).await?;
        let items = decode_all(collection, "query", documents)?;
        debug!(collection, count = items.len(), "Queried documents");
        Ok(items)
    }

    /// Runs a query and returns the raw documents.
    pub async fn query_documents(
        &self,
        collection: Collection,
        constraints: impl IntoIterator<Item = QueryConstraint>,
    ) -> StorageResult<Vec<StoredDocument>> {
        let collection = collection.as_str();
        let store = self.store(collection)?;

        let query = DocumentQuery::compile(constraints)
            .map_err(|e| read_failed(collection, "query", e))?;
        store
            .query(collection, &query)
            .await
            .map_err(|e| read_failed(collection, "query", e))
    }

    /// Returns up to `page_size` entities after `cursor`, in id order.
    ///
    /// `has_more` is exact: one extra document is fetched to decide it. The
    /// returned cursor points at the last item and is present whenever the
    /// page is non-empty. A `page_size` of zero is a read failure.
    pub async fn paginate<E: Entity>(
        &self,
        page_size: usize,
        cursor: Option<&str>,
    ) -> StorageResult<Page<Stored<E>>> {
        let collection = E::COLLECTION.as_str();
        let page = self.paginate_documents(E::COLLECTION, page_size, cursor).await?;
        let items = decode_all(collection, "paginate", page.items)?;
        Ok(Page::new(items, page.cursor, page.has_more))
    }

    /// Raw-document form of [`DocumentAccess::paginate`].
    pub async fn paginate_documents(
        &self,
        collection: Collection,
        page_size: usize,
        cursor: Option<&str>,
    ) -> StorageResult<Page<StoredDocument>> {
        let collection = collection.as_str();
        let store = self.store(collection)?;

        if page_size == 0 {
            return Err(read_failed(
                collection,
                "paginate",
                BackendError::QueryError {
                    message: "page size must be at least 1".to_string(),
                },
            ));
        }

        let start_after = cursor
            .map(PageCursor::decode)
            .transpose()
            .map_err(|e| read_failed(collection, "paginate", e))?;
        let query = DocumentQuery::default()
            .with_start_after(start_after)
            .with_limit(page_size.saturating_add(1));

        let mut documents = store
            .query(collection, &query)
            .await
            .map_err(|e| read_failed(collection, "paginate", e))?;

        let has_more = documents.len() > page_size;
        documents.truncate(page_size);
        let next = match documents.last() {
            Some(last) => Some(
                PageCursor::after(last, &[])
                    .map_err(|e| read_failed(collection, "paginate", e))?
                    .encode(),
            ),
            None => None,
        };

        debug!(collection, count = documents.len(), has_more, "Paginated documents");
        Ok(Page::new(documents, next, has_more))
    }

    /// Merges the fields set in `patch` into an existing document.
    ///
    /// `updatedAt` is refreshed; `createdAt` and unset fields are untouched.
    /// A patch touching the inputs or outputs of a derived field has the
    /// derived fields recomputed from the merged document, within the same
    /// store write. Updating a missing document is a write failure.
    pub async fn update<E: Entity>(&self, id: &str, patch: &E::Patch) -> StorageResult<()> {
        let collection = E::COLLECTION.as_str();
        let store = self.store(collection)?;

        let mut fields =
            to_field_map(patch).map_err(|e| write_failed(collection, "update", e))?;
        for key in [ID, CREATED_AT] {
            fields.remove(key);
        }

        let touches_derived = E::DERIVED_INPUTS
            .iter()
            .chain(E::DERIVED_OUTPUTS)
            .any(|key| fields.contains_key(*key));

        fields.insert(
            UPDATED_AT.to_string(),
            Value::String(timestamp::format(&self.clock.now())),
        );

        let merged = if touches_derived {
            store
                .merge_with(collection, id, fields, rederive::<E>(id))
                .await
        } else {
            store.merge(collection, id, fields).await
        };
        let found = merged.map_err(|e| write_failed(collection, "update", e))?;
        if !found {
            return Err(write_failed(collection, "update", missing(id)));
        }

        debug!(collection, id, touches_derived, "Updated document");
        Ok(())
    }

    /// Deletes a document. Deleting an absent document succeeds; related
    /// documents in other collections are left in place.
    pub async fn delete<E: Entity>(&self, id: &str) -> StorageResult<()> {
        self.delete_in(E::COLLECTION, id).await
    }

    /// Deletes a document from a collection named at runtime.
    pub async fn delete_in(&self, collection: Collection, id: &str) -> StorageResult<()> {
        let collection = collection.as_str();
        let store = self.store(collection)?;
        store
            .remove(collection, id)
            .await
            .map_err(|e| write_failed(collection, "delete", e))?;
        debug!(collection, id, "Deleted document");
        Ok(())
    }

    /// Checks whether a document exists without decoding it.
    pub async fn exists<E: Entity>(&self, id: &str) -> StorageResult<bool> {
        let collection = E::COLLECTION.as_str();
        let store = self.store(collection)?;
        let found = store
            .exists(collection, id)
            .await
            .map_err(|e| read_failed(collection, "exists", e))?;
        debug!(collection, id, found, "Checked document existence");
        Ok(found)
    }

    /// Counts the documents of the entity's collection.
    pub async fn count<E: Entity>(&self) -> StorageResult<u64> {
        self.count_in(E::COLLECTION).await
    }

    /// Counts the documents of a collection named at runtime.
    pub async fn count_in(&self, collection: Collection) -> StorageResult<u64> {
        let collection = collection.as_str();
        let store = self.store(collection)?;
        let count = store
            .count(collection)
            .await
            .map_err(|e| read_failed(collection, "count", e))?;
        debug!(collection, count, "Counted documents");
        Ok(count)
    }

    /// Writes, reads back and deletes a document in [`PROBE_COLLECTION`].
    ///
    /// Store faults are reported in the returned [`ProbeReport`]; only a
    /// missing connection is an error.
    pub async fn probe(&self) -> StorageResult<ProbeReport> {
        let store = self.store(PROBE_COLLECTION)?;
        let mut report = ProbeReport {
            can_write: false,
            can_read: false,
            documents_found: 0,
            error: None,
        };

        let id = Uuid::new_v4().simple().to_string();
        let mut fields = FieldMap::new();
        fields.insert(
            "timestamp".to_string(),
            Value::String(timestamp::format(&self.clock.now())),
        );
        fields.insert("test".to_string(), Value::Bool(true));

        if let Err(e) = store.insert(PROBE_COLLECTION, &id, fields).await {
            warn!(error = %e, "Connection probe could not write");
            report.error = Some(e.to_string());
            return Ok(report);
        }
        report.can_write = true;

        match store.list(PROBE_COLLECTION).await {
            Ok(documents) => {
                report.can_read = true;
                report.documents_found = documents.len() as u64;
            }
            Err(e) => {
                warn!(error = %e, "Connection probe could not read");
                report.error = Some(e.to_string());
            }
        }

        if let Err(e) = store.remove(PROBE_COLLECTION, &id).await {
            warn!(error = %e, "Connection probe could not clean up");
            report.error.get_or_insert_with(|| e.to_string());
        }

        debug!(
            can_write = report.can_write,
            can_read = report.can_read,
            documents_found = report.documents_found,
            "Connection probe finished"
        );
        Ok(report)
    }
}

/// Builds a cursor positioned at `item` under `order`, for use with
/// [`start_after`](crate::types::start_after).
pub fn cursor_after<E: Entity>(item: &Stored<E>, order: &[SortKey]) -> StorageResult<PageCursor> {
    let collection = E::COLLECTION.as_str();
    let fields = to_field_map(item).map_err(|e| read_failed(collection, "cursor", e))?;
    PageCursor::after(&StoredDocument::new(item.id.clone(), fields), order)
        .map_err(|e| read_failed(collection, "cursor", e))
}

/// Recomputes `E`'s derived outputs from a merged document.
fn rederive<E: Entity>(id: &str) -> Recompute {
    let id = id.to_string();
    Box::new(move |merged: &mut FieldMap| -> BackendResult<()> {
        let mut entity = Stored::<E>::from_fields(&id, merged.clone())?.into_inner();
        entity.derive();
        let mut all = to_field_map(&entity)?;
        for key in E::DERIVED_OUTPUTS {
            if let Some(value) = all.remove(*key) {
                merged.insert(key.to_string(), value);
            }
        }
        Ok(())
    })
}

fn decode_all<E: Entity>(
    collection: &str,
    operation: &'static str,
    documents: Vec<StoredDocument>,
) -> StorageResult<Vec<Stored<E>>> {
    documents
        .into_iter()
        .map(|doc| doc.decode())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| read_failed(collection, operation, e))
}

fn missing(id: &str) -> BackendError {
    BackendError::MissingDocument { id: id.to_string() }
}

fn read_failed(collection: &str, operation: &'static str, err: BackendError) -> StorageError {
    warn!(collection, operation, error = %err, "Document read failed");
    StorageError::read(collection, err)
}

fn write_failed(collection: &str, operation: &'static str, err: BackendError) -> StorageError {
    warn!(collection, operation, error = %err, "Document write failed");
    StorageError::write(collection, err)
}
