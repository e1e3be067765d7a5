//! Application services: the operations behind every HTTP route.
//!
//! Services own no state of their own. They compose [`RecordStore`] handles
//! from a [`Stores`] bundle that the process entry point builds once and
//! injects.

pub mod accounts;
pub mod branches;
pub mod ledger;
pub mod suppliers;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use payables_auth::{AuthError, UserAccount};
use payables_core::DomainError;
use payables_directory::{Branch, Supplier};
use payables_invoicing::Invoice;

use crate::store::{InMemoryRecordStore, RecordStore, StoreError};

pub use accounts::{AccountService, Session};
pub use branches::{BranchService, SeedOutcome, SeedReport, SeedStatus};
pub use ledger::{InvoiceLedger, InvoiceListing, InvoiceUpdate};
pub use suppliers::SupplierService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Referential-integrity block on branch deletion.
    #[error("Cannot delete branch: {count} invoice(s) still reference it")]
    BranchInUse { count: u64 },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One store handle per record collection.
#[derive(Clone)]
pub struct Stores {
    pub suppliers: Arc<dyn RecordStore<Supplier>>,
    pub branches: Arc<dyn RecordStore<Branch>>,
    pub invoices: Arc<dyn RecordStore<Invoice>>,
    pub users: Arc<dyn RecordStore<UserAccount>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            suppliers: Arc::new(InMemoryRecordStore::<Supplier>::new()),
            branches: Arc::new(InMemoryRecordStore::<Branch>::new()),
            invoices: Arc::new(InMemoryRecordStore::<Invoice>::new()),
            users: Arc::new(InMemoryRecordStore::<UserAccount>::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use crate::store::PostgresRecordStore;

        Self {
            suppliers: Arc::new(PostgresRecordStore::<Supplier>::new(pool.clone())),
            branches: Arc::new(PostgresRecordStore::<Branch>::new(pool.clone())),
            invoices: Arc::new(PostgresRecordStore::<Invoice>::new(pool.clone())),
            users: Arc::new(PostgresRecordStore::<UserAccount>::new(pool)),
        }
    }
}

/// JSON form of an id for field lookups.
pub(crate) fn id_value(id: impl core::fmt::Display) -> Value {
    Value::String(id.to_string())
}
