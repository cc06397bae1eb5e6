//! [`DocumentStore`] implementation for SQLite.
//!
//! rusqlite is synchronous, so each operation checks a connection out of the
//! pool on tokio's blocking thread pool.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, TransactionBehavior, params, params_from_iter};
use serde_json::Value;

use crate::core::{DocumentStore, Recompute};
use crate::error::{BackendError, BackendResult};
use crate::schema::{CREATED_AT, FieldMap, UPDATED_AT};
use crate::types::{DocumentQuery, StoredDocument};

use super::SqliteStore;
use super::backend::BACKEND_NAME;
use super::query_builder::QueryBuilder;

type Conn = PooledConnection<SqliteConnectionManager>;

impl SqliteStore {
    /// Runs `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Conn, &str) -> BackendResult<T> + Send + 'static,
    {
        let pool: Pool<SqliteConnectionManager> = self.pool();
        let project_id = self.project_id().to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: e.to_string(),
            })?;
            f(&mut conn, &project_id)
        })
        .await?
    }
}

fn parse_fields(data: &str) -> BackendResult<FieldMap> {
    match serde_json::from_str(data)? {
        Value::Object(map) => Ok(map),
        _ => Err(BackendError::SerializationError {
            message: "stored document is not a JSON object".to_string(),
        }),
    }
}

fn timestamp(fields: &FieldMap, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_documents(
    conn: &Conn,
    sql: &str,
    params: impl rusqlite::Params,
) -> BackendResult<Vec<StoredDocument>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut documents = Vec::new();
    for row in rows {
        let (id, data) = row?;
        documents.push(StoredDocument::new(id, parse_fields(&data)?));
    }
    Ok(documents)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn insert(&self, collection: &str, id: &str, fields: FieldMap) -> BackendResult<()> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.with_conn(move |conn, project_id| {
            let created_at = timestamp(&fields, CREATED_AT);
            let updated_at = timestamp(&fields, UPDATED_AT);
            let data = serde_json::to_string(&fields)?;
            conn.execute(
                "INSERT INTO documents (project_id, collection, id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![project_id, collection, id, data, created_at, updated_at],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    BackendError::QueryError {
                        message: format!("document {} already exists in {}", id, collection),
                    }
                }
                other => other.into(),
            })?;
            Ok(())
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<FieldMap>> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.with_conn(move |conn, project_id| {
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM documents
                     WHERE project_id = ?1 AND collection = ?2 AND id = ?3",
                    params![project_id, collection, id],
                    |row| row.get(0),
                )
                .optional()?;
            data.as_deref().map(parse_fields).transpose()
        })
        .await
    }

    async fn list(&self, collection: &str) -> BackendResult<Vec<StoredDocument>> {
        let collection = collection.to_string();
        self.with_conn(move |conn, project_id| {
            read_documents(
                conn,
                "SELECT id, data FROM documents WHERE project_id = ?1 AND collection = ?2",
                params![project_id, collection],
            )
        })
        .await
    }

    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> BackendResult<Vec<StoredDocument>> {
        let collection = collection.to_string();
        let query = query.clone();
        self.with_conn(move |conn, project_id| {
            let frag = QueryBuilder::new(project_id, &collection).build(&query);
            tracing::trace!(sql = %frag.sql, params = frag.params.len(), "Executing document query");
            read_documents(conn, &frag.sql, params_from_iter(frag.params.iter()))
        })
        .await
    }

    async fn merge_with(
        &self,
        collection: &str,
        id: &str,
        fields: FieldMap,
        recompute: Recompute,
    ) -> BackendResult<bool> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.with_conn(move |conn, project_id| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let current: Option<String> = tx
                .query_row(
                    "SELECT data FROM documents
                     WHERE project_id = ?1 AND collection = ?2 AND id = ?3",
                    params![project_id, collection, id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };

            let mut merged = parse_fields(&current)?;
            for (key, value) in fields {
                merged.insert(key, value);
            }
            recompute(&mut merged)?;

            let updated_at = timestamp(&merged, UPDATED_AT);
            let data = serde_json::to_string(&merged)?;
            tx.execute(
                "UPDATE documents SET data = ?1, updated_at = ?2
                 WHERE project_id = ?3 AND collection = ?4 AND id = ?5",
                params![data, updated_at, project_id, collection, id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    async fn remove(&self, collection: &str, id: &str) -> BackendResult<()> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.with_conn(move |conn, project_id| {
            conn.execute(
                "DELETE FROM documents WHERE project_id = ?1 AND collection = ?2 AND id = ?3",
                params![project_id, collection, id],
            )?;
            Ok(())
        })
        .await
    }

    async fn exists(&self, collection: &str, id: &str) -> BackendResult<bool> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.with_conn(move |conn, project_id| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM documents
                     WHERE project_id = ?1 AND collection = ?2 AND id = ?3",
                    params![project_id, collection, id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn count(&self, collection: &str) -> BackendResult<u64> {
        let collection = collection.to_string();
        self.with_conn(move |conn, project_id| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE project_id = ?1 AND collection = ?2",
                params![project_id, collection],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}
