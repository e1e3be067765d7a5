//! Read-side views over the ledger: list filters, aggregate totals and the
//! dashboard summary.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use payables_core::{BranchId, InvoiceId, SupplierId};
use payables_directory::{Branch, Supplier};

use crate::discrepancy::discrepancy_ids;
use crate::invoice::{DocumentType, Invoice, PaymentStatus};

/// Relative creation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Quarter,
}

impl Period {
    pub fn days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
        }
    }

    /// Earliest `created_at` still inside the window.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Invoice list filter. Every criterion is optional; unset criteria match all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceFilter {
    /// Case-insensitive substring of supplier name, branch name, description
    /// or invoice number.
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub document_type: Option<DocumentType>,
    pub branch_id: Option<BranchId>,
    pub supplier_id: Option<SupplierId>,
    pub discrepancies_only: bool,
    pub period: Option<Period>,
}

impl InvoiceFilter {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn matches(
        &self,
        inv: &Invoice,
        needle: Option<&str>,
        flagged: &HashSet<InvoiceId>,
        cutoff: Option<DateTime<Utc>>,
    ) -> bool {
        if let Some(status) = self.status {
            if inv.status() != status {
                return false;
            }
        }
        if let Some(kind) = self.document_type {
            if inv.document_type() != kind {
                return false;
            }
        }
        if let Some(branch) = self.branch_id {
            if inv.branch_id() != branch {
                return false;
            }
        }
        if let Some(supplier) = self.supplier_id {
            if inv.supplier_id() != supplier {
                return false;
            }
        }
        if self.discrepancies_only && !flagged.contains(&inv.id_typed()) {
            return false;
        }
        if let Some(cutoff) = cutoff {
            if payables_core::Record::created_at(inv) < cutoff {
                return false;
            }
        }
        match needle {
            None => true,
            Some(needle) => [
                inv.supplier_name(),
                inv.branch_name(),
                inv.description(),
                inv.invoice_number(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle)),
        }
    }

    /// Keep the invoices matching every set criterion, preserving input order.
    ///
    /// `suppliers` is only consulted when `discrepancies_only` is set.
    pub fn apply<'a>(
        &self,
        invoices: &'a [Invoice],
        suppliers: &[Supplier],
        now: DateTime<Utc>,
    ) -> Vec<&'a Invoice> {
        let flagged = if self.discrepancies_only {
            discrepancy_ids(invoices, suppliers)
        } else {
            HashSet::new()
        };
        let needle = self.needle();
        let cutoff = self.period.map(|p| p.cutoff(now));

        invoices
            .iter()
            .filter(|inv| self.matches(inv, needle.as_deref(), &flagged, cutoff))
            .collect()
    }
}

/// Aggregate amounts of a set of invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub count: usize,
    pub total_amount: u64,
    pub amount_paid: u64,
    pub remaining_balance: u64,
}

impl InvoiceTotals {
    /// Sums saturate instead of wrapping.
    pub fn of<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices.into_iter().fold(Self::default(), |acc, inv| Self {
            count: acc.count + 1,
            total_amount: acc.total_amount.saturating_add(inv.total_amount()),
            amount_paid: acc.amount_paid.saturating_add(inv.amount_paid()),
            remaining_balance: acc.remaining_balance.saturating_add(inv.remaining_balance()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub unpaid: usize,
    pub partially_paid: usize,
    pub paid: usize,
}

/// Dashboard figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub active_suppliers: usize,
    pub active_branches: usize,
    pub invoices: StatusCounts,
    /// Remaining balance of unpaid and partially paid invoices.
    pub total_pending: u64,
    /// Amount paid on paid and partially paid invoices.
    pub total_paid: u64,
    pub discrepancies: usize,
}

impl LedgerSummary {
    pub fn compute(invoices: &[Invoice], suppliers: &[Supplier], branches: &[Branch]) -> Self {
        let mut summary = LedgerSummary {
            active_suppliers: suppliers.iter().filter(|s| s.is_active()).count(),
            active_branches: branches.iter().filter(|b| b.is_active()).count(),
            discrepancies: discrepancy_ids(invoices, suppliers).len(),
            ..Default::default()
        };

        for inv in invoices {
            match inv.status() {
                PaymentStatus::Unpaid => {
                    summary.invoices.unpaid += 1;
                    summary.total_pending = summary.total_pending.saturating_add(inv.remaining_balance());
                }
                PaymentStatus::PartiallyPaid => {
                    summary.invoices.partially_paid += 1;
                    summary.total_pending = summary.total_pending.saturating_add(inv.remaining_balance());
                    summary.total_paid = summary.total_paid.saturating_add(inv.amount_paid());
                }
                PaymentStatus::Paid => {
                    summary.invoices.paid += 1;
                    summary.total_paid = summary.total_paid.saturating_add(inv.amount_paid());
                }
            }
        }
        summary
    }
}
