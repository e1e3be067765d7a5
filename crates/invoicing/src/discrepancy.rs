//! Delivery-note discrepancy detection.
//!
//! A discrepancy is a delivery note recorded against a supplier flagged as
//! required to issue Invoice A.

use std::collections::HashSet;

use payables_core::{InvoiceId, SupplierId};
use payables_directory::Supplier;

use crate::invoice::{DocumentType, Invoice};

fn flagged_suppliers(suppliers: &[Supplier]) -> HashSet<SupplierId> {
    suppliers
        .iter()
        .filter(|s| s.must_issue_invoice_a())
        .map(|s| s.id_typed())
        .collect()
}

/// Invoices that are delivery notes from flagged suppliers, in input order.
///
/// Invoices whose supplier is missing from `suppliers` are never flagged.
pub fn detect_discrepancies<'a>(invoices: &'a [Invoice], suppliers: &[Supplier]) -> Vec<&'a Invoice> {
    let flagged = flagged_suppliers(suppliers);
    invoices
        .iter()
        .filter(|inv| {
            inv.document_type() == DocumentType::DeliveryNote && flagged.contains(&inv.supplier_id())
        })
        .collect()
}

pub fn discrepancy_ids(invoices: &[Invoice], suppliers: &[Supplier]) -> HashSet<InvoiceId> {
    detect_discrepancies(invoices, suppliers)
        .into_iter()
        .map(|inv| inv.id_typed())
        .collect()
}
