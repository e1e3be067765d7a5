//! Persistable record contract shared by every stored document type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A document that lives in a named collection of the record store.
///
/// Stores key records by `id().to_string()` and list them newest first by
/// `created_at()`. Field-based lookups operate on the serialized (JSON) shape,
/// so field names are the serde names of the implementing type.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table / document set) name.
    const COLLECTION: &'static str;

    /// Human-readable kind used in error messages ("supplier", "invoice", ...).
    const KIND: &'static str;

    type Id: Copy + Eq + core::hash::Hash + core::fmt::Display + core::fmt::Debug + Serialize + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;
}
