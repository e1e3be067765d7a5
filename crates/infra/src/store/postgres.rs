//! Postgres-backed record store.
//!
//! Every record type shares one `documents` table; rows are partitioned by
//! `collection` and hold the record's JSON form in a JSONB `body` column.
//! Field lookups compare `body -> field` against a JSONB value, so they see
//! exactly what the in-memory store sees.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Anything else | - | `Backend` |

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::instrument;

use payables_core::Record;

use super::{RecordStore, StoreError};

/// Open a connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the `documents` table and its indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("ensure_schema", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS documents_collection_created_idx ON documents (collection, created_at DESC)",
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("ensure_schema", e))?;

    Ok(())
}

/// Postgres store for one record type.
///
/// `PgPool` is a shared handle, so cloning the store is cheap and every clone
/// talks to the same pool.
#[derive(Debug)]
pub struct PostgresRecordStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> PostgresRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn encode(record: &R) -> Result<Value, StoreError> {
        serde_json::to_value(record).map_err(StoreError::codec::<R>)
    }

    fn decode(body: Value) -> Result<R, StoreError> {
        serde_json::from_value(body).map_err(StoreError::codec::<R>)
    }

    fn decode_rows(rows: Vec<sqlx::postgres::PgRow>, operation: &'static str) -> Result<Vec<R>, StoreError> {
        rows.into_iter()
            .map(|row| {
                let body: Value = row
                    .try_get("body")
                    .map_err(|e| map_sqlx_error(operation, e))?;
                Self::decode(body)
            })
            .collect()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for PostgresRecordStore<R> {
    #[instrument(skip(self, record), fields(collection = R::COLLECTION), err)]
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let body = Self::encode(&record)?;
        sqlx::query("INSERT INTO documents (collection, id, body, created_at) VALUES ($1, $2, $3, $4)")
            .bind(R::COLLECTION)
            .bind(record.id().to_string())
            .bind(body)
            .bind(record.created_at())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate {
                        kind: R::KIND,
                        id: record.id().to_string(),
                    }
                } else {
                    map_sqlx_error("insert", e)
                }
            })?;
        Ok(record)
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id), err)]
    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(R::COLLECTION)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        match row {
            Some(row) => {
                let body: Value = row.try_get("body").map_err(|e| map_sqlx_error("get", e))?;
                Ok(Some(Self::decode(body)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, record), fields(collection = R::COLLECTION), err)]
    async fn replace(&self, record: R) -> Result<bool, StoreError> {
        let body = Self::encode(&record)?;
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(R::COLLECTION)
            .bind(record.id().to_string())
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("replace", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id), err)]
    async fn delete(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING body")
            .bind(R::COLLECTION)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        match row {
            Some(row) => {
                let body: Value = row.try_get("body").map_err(|e| map_sqlx_error("delete", e))?;
                Ok(Some(Self::decode(body)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION), err)]
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(R::COLLECTION)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;
        Self::decode_rows(rows, "list")
    }

    #[instrument(skip(self, value), fields(collection = R::COLLECTION), err)]
    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<R>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body -> $2::text = $3::jsonb
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(R::COLLECTION)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by", e))?;
        Self::decode_rows(rows, "find_by")
    }

    #[instrument(skip(self, value), fields(collection = R::COLLECTION), err)]
    async fn count_by(&self, field: &str, value: &Value) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM documents WHERE collection = $1 AND body -> $2::text = $3::jsonb",
        )
        .bind(R::COLLECTION)
        .bind(field)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_by", e))?;

        let total: i64 = row.try_get("total").map_err(|e| map_sqlx_error("count_by", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self, value, set), fields(collection = R::COLLECTION), err)]
    async fn update_many(
        &self,
        field: &str,
        value: &Value,
        set: &Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let patch = Value::Object(set.clone());
        let result = sqlx::query(
            "UPDATE documents SET body = body || $4::jsonb WHERE collection = $1 AND body -> $2::text = $3::jsonb",
        )
        .bind(R::COLLECTION)
        .bind(field)
        .bind(value)
        .bind(patch)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_many", e))?;
        Ok(result.rows_affected())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::backend(operation, format!("database error: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
