//! `payables-core`: shared building blocks for the payables domain.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod record;

pub use error::{DomainError, DomainResult};
pub use id::{BranchId, InvoiceId, SupplierId, UserId};
pub use record::Record;
