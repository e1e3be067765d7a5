//! Invoice ledger service: creation, payments, edits and read views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use payables_core::{BranchId, DomainError, InvoiceId, SupplierId};
use payables_directory::{Branch, Supplier};
use payables_invoicing::{
    Invoice, InvoiceFilter, InvoicePatch, InvoiceTotals, LedgerSummary, NewInvoice, PaymentEntry,
    detect_discrepancies,
};

use super::{ServiceResult, Stores};
use crate::store::RecordStore;

/// Field edit, optionally moving the invoice to another supplier or branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceUpdate {
    pub supplier_id: Option<SupplierId>,
    pub branch_id: Option<BranchId>,
    #[serde(flatten)]
    pub fields: InvoicePatch,
}

/// Filtered invoices (newest first) and the totals of exactly that set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceListing {
    pub items: Vec<Invoice>,
    pub totals: InvoiceTotals,
}

#[derive(Clone)]
pub struct InvoiceLedger {
    suppliers: Arc<dyn RecordStore<Supplier>>,
    branches: Arc<dyn RecordStore<Branch>>,
    invoices: Arc<dyn RecordStore<Invoice>>,
}

impl InvoiceLedger {
    pub fn new(stores: &Stores) -> Self {
        Self {
            suppliers: stores.suppliers.clone(),
            branches: stores.branches.clone(),
            invoices: stores.invoices.clone(),
        }
    }

    async fn supplier(&self, id: SupplierId) -> ServiceResult<Supplier> {
        Ok(self
            .suppliers
            .get(id)
            .await?
            .ok_or(DomainError::not_found("supplier"))?)
    }

    async fn branch(&self, id: BranchId) -> ServiceResult<Branch> {
        Ok(self
            .branches
            .get(id)
            .await?
            .ok_or(DomainError::not_found("branch"))?)
    }

    async fn invoice(&self, id: InvoiceId) -> ServiceResult<Invoice> {
        Ok(self
            .invoices
            .get(id)
            .await?
            .ok_or(DomainError::not_found("invoice"))?)
    }

    async fn ensure_number_free(&self, number: &str, except: Option<InvoiceId>) -> ServiceResult<()> {
        let number = number.trim();
        if number.is_empty() {
            return Ok(());
        }
        let taken = self
            .invoices
            .find_by("invoice_number", &Value::String(number.to_string()))
            .await?
            .iter()
            .any(|inv| Some(inv.id_typed()) != except);
        if taken {
            warn!(invoice_number = number, "invoice number already recorded");
            return Err(DomainError::conflict("An invoice with this number already exists").into());
        }
        Ok(())
    }

    pub async fn get(&self, id: InvoiceId) -> ServiceResult<Invoice> {
        self.invoice(id).await
    }

    pub async fn list(&self, filter: &InvoiceFilter, now: DateTime<Utc>) -> ServiceResult<InvoiceListing> {
        let invoices = self.invoices.list().await?;
        let suppliers = if filter.discrepancies_only {
            self.suppliers.list().await?
        } else {
            Vec::new()
        };

        let items: Vec<Invoice> = filter
            .apply(&invoices, &suppliers, now)
            .into_iter()
            .cloned()
            .collect();
        let totals = InvoiceTotals::of(&items);
        Ok(InvoiceListing { items, totals })
    }

    /// Record a new invoice. Supplier and branch must exist; nothing is written
    /// otherwise.
    #[instrument(skip_all, fields(supplier_id = %input.supplier_id, branch_id = %input.branch_id))]
    pub async fn create(&self, input: NewInvoice, now: DateTime<Utc>) -> ServiceResult<Invoice> {
        let supplier = self.supplier(input.supplier_id).await?;
        let branch = self.branch(input.branch_id).await?;
        self.ensure_number_free(&input.invoice_number, None).await?;

        let invoice = Invoice::issue(InvoiceId::new(), input, &supplier, &branch, now)?;
        let invoice = self.invoices.insert(invoice).await?;
        info!(
            invoice_id = %invoice.id_typed(),
            invoice_number = invoice.invoice_number(),
            total_amount = invoice.total_amount(),
            "invoice recorded"
        );
        Ok(invoice)
    }

    #[instrument(skip(self, update), fields(invoice_id = %id))]
    pub async fn update(&self, id: InvoiceId, update: InvoiceUpdate) -> ServiceResult<Invoice> {
        let mut invoice = self.invoice(id).await?;

        let supplier = match update.supplier_id {
            Some(sid) if sid != invoice.supplier_id() => Some(self.supplier(sid).await?),
            _ => None,
        };
        let branch = match update.branch_id {
            Some(bid) if bid != invoice.branch_id() => Some(self.branch(bid).await?),
            _ => None,
        };
        if let Some(number) = update.fields.invoice_number.as_deref() {
            self.ensure_number_free(number, Some(id)).await?;
        }

        invoice.apply_patch(update.fields)?;
        if let Some(supplier) = supplier {
            invoice.reassign_supplier(&supplier);
        }
        if let Some(branch) = branch {
            invoice.reassign_branch(&branch);
        }

        if !self.invoices.replace(invoice.clone()).await? {
            return Err(DomainError::not_found("invoice").into());
        }
        info!(
            amount_paid = invoice.amount_paid(),
            remaining_balance = invoice.remaining_balance(),
            "invoice updated"
        );
        Ok(invoice)
    }

    /// Read-modify-write of one invoice. Two concurrent payments on the same
    /// invoice can lose one of the updates.
    #[instrument(skip(self, payment), fields(invoice_id = %id, amount = payment.amount))]
    pub async fn apply_payment(&self, id: InvoiceId, payment: PaymentEntry) -> ServiceResult<Invoice> {
        if payment.amount == 0 {
            warn!("rejected zero payment");
            return Err(DomainError::validation("payment amount must be positive").into());
        }
        let mut invoice = self.invoice(id).await?;
        invoice.apply_payment(payment)?;

        if !self.invoices.replace(invoice.clone()).await? {
            return Err(DomainError::not_found("invoice").into());
        }
        info!(
            amount_paid = invoice.amount_paid(),
            remaining_balance = invoice.remaining_balance(),
            status = ?invoice.status(),
            "payment applied"
        );
        Ok(invoice)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete(&self, id: InvoiceId) -> ServiceResult<Invoice> {
        let invoice = self
            .invoices
            .delete(id)
            .await?
            .ok_or(DomainError::not_found("invoice"))?;
        info!("invoice deleted");
        Ok(invoice)
    }

    /// Delivery notes from suppliers that must issue Invoice A, newest first.
    pub async fn discrepancies(&self) -> ServiceResult<Vec<Invoice>> {
        let invoices = self.invoices.list().await?;
        let suppliers = self.suppliers.list().await?;
        Ok(detect_discrepancies(&invoices, &suppliers)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn summary(&self) -> ServiceResult<LedgerSummary> {
        let invoices = self.invoices.list().await?;
        let suppliers = self.suppliers.list().await?;
        let branches = self.branches.list().await?;
        Ok(LedgerSummary::compute(&invoices, &suppliers, &branches))
    }
}
