//! Invoice ledger domain module.
//!
//! This crate contains the business rules for supplier invoices: issuing,
//! applying payments, field updates with balance/status recomputation, and
//! the delivery-note discrepancy rule. Pure domain logic only (no IO, no HTTP,
//! no storage).

pub mod discrepancy;
pub mod invoice;
pub mod query;

pub use discrepancy::{detect_discrepancies, discrepancy_ids};
pub use invoice::{
    DocumentType, Invoice, InvoicePatch, NewInvoice, PaymentEntry, PaymentMethod, PaymentStatus,
};
pub use query::{InvoiceFilter, InvoiceTotals, LedgerSummary, Period, StatusCounts};
