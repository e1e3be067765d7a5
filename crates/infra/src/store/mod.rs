//! Document-style record persistence.
//!
//! One collection per record type, keyed by the record's id. Field lookups
//! and bulk updates work on top-level fields of the record's JSON form, so an
//! implementation only needs to understand `serde_json::Value`.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use payables_core::Record;

pub use in_memory::InMemoryRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error("failed to encode/decode {kind} document: {source}")]
    Codec {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("store backend error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn codec<R: Record>(source: serde_json::Error) -> Self {
        Self::Codec {
            kind: R::KIND,
            source,
        }
    }
}

/// Async CRUD over one record collection.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Insert a new record. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError>;

    /// Overwrite an existing record. Returns `false` if it does not exist.
    async fn replace(&self, record: R) -> Result<bool, StoreError>;

    /// Remove and return the record, if present.
    async fn delete(&self, id: R::Id) -> Result<Option<R>, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    /// Records whose top-level `field` equals `value`, newest first.
    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<R>, StoreError>;

    async fn count_by(&self, field: &str, value: &Value) -> Result<u64, StoreError> {
        Ok(self.find_by(field, value).await?.len() as u64)
    }

    /// Set the fields in `set` on every record whose `field` equals `value`.
    /// Returns the number of records touched.
    async fn update_many(
        &self,
        field: &str,
        value: &Value,
        set: &Map<String, Value>,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
impl<R, S> RecordStore<R> for Arc<S>
where
    R: Record,
    S: RecordStore<R> + ?Sized,
{
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        (**self).insert(record).await
    }

    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        (**self).get(id).await
    }

    async fn replace(&self, record: R) -> Result<bool, StoreError> {
        (**self).replace(record).await
    }

    async fn delete(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        (**self).list().await
    }

    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<R>, StoreError> {
        (**self).find_by(field, value).await
    }

    async fn count_by(&self, field: &str, value: &Value) -> Result<u64, StoreError> {
        (**self).count_by(field, value).await
    }

    async fn update_many(
        &self,
        field: &str,
        value: &Value,
        set: &Map<String, Value>,
    ) -> Result<u64, StoreError> {
        (**self).update_many(field, value, set).await
    }
}
