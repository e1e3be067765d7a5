//! Supplier and branch directory (pure domain, no IO).
//!
//! Suppliers are the counterparties that send invoices; branches are the
//! store locations invoices are recorded against.

pub mod branch;
pub mod supplier;

pub use branch::{Branch, BranchUpdate, DEFAULT_BRANCHES, DefaultBranch, NewBranch};
pub use supplier::{NewSupplier, Supplier, SupplierStatus, SupplierUpdate};
