use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use payables_core::{BranchId, DomainError, DomainResult, InvoiceId, Record, SupplierId};
use payables_directory::{Branch, Supplier};

/// Kind of document the supplier handed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    InvoiceA,
    InvoiceB,
    InvoiceC,
    /// Delivery note ("remito"): goods received without a tax invoice.
    DeliveryNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MercadoPago,
    BankTransferBbva,
    BankTransfer,
}

/// Payment status, always derived from `(total_amount, amount_paid)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    /// Three-way status rule. Nothing paid wins over "paid", so a zero-total
    /// invoice with no payments is still `Unpaid`.
    pub fn derive(total_amount: u64, amount_paid: u64) -> Self {
        if amount_paid == 0 {
            PaymentStatus::Unpaid
        } else if amount_paid >= total_amount {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }
}

/// One payment applied to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub payment_date: NaiveDate,
    /// Amount in smallest currency unit. Always > 0.
    pub amount: u64,
    pub payment_method: PaymentMethod,
}

/// Input for recording a new invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub supplier_id: SupplierId,
    pub branch_id: BranchId,
    pub invoice_number: String,
    pub document_date: NaiveDate,
    pub received_date: NaiveDate,
    pub document_type: DocumentType,
    #[serde(default)]
    pub description: Option<String>,
    /// Amount in smallest currency unit.
    pub total_amount: u64,
}

/// Direct field edit. `amount_paid`, when present, overwrites the accumulated
/// amount instead of adding to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub invoice_number: Option<String>,
    pub document_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub document_type: Option<DocumentType>,
    pub description: Option<String>,
    pub total_amount: Option<u64>,
    pub amount_paid: Option<u64>,
}

/// A supplier invoice tracked as a payable with partial-payment support.
///
/// # Invariants
/// - `remaining_balance == total_amount.saturating_sub(amount_paid)`
/// - `status == PaymentStatus::derive(total_amount, amount_paid)`
/// - `payment_history` only grows through `apply_payment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    supplier_id: SupplierId,
    supplier_name: String,
    branch_id: BranchId,
    branch_name: String,
    document_date: NaiveDate,
    received_date: NaiveDate,
    document_type: DocumentType,
    description: String,
    total_amount: u64,
    amount_paid: u64,
    remaining_balance: u64,
    status: PaymentStatus,
    payment_history: Vec<PaymentEntry>,
    created_at: DateTime<Utc>,
}

fn normalize_number(number: &str) -> DomainResult<String> {
    let number = number.trim();
    if number.is_empty() {
        return Err(DomainError::validation("invoice number is required"));
    }
    Ok(number.to_string())
}

impl Invoice {
    /// Record a new invoice against a resolved supplier and branch.
    ///
    /// Names are copied from the referenced records so listings don't need a join.
    pub fn issue(
        id: InvoiceId,
        input: NewInvoice,
        supplier: &Supplier,
        branch: &Branch,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if supplier.id_typed() != input.supplier_id {
            return Err(DomainError::validation("supplier does not match invoice input"));
        }
        if branch.id_typed() != input.branch_id {
            return Err(DomainError::validation("branch does not match invoice input"));
        }

        Ok(Self {
            id,
            invoice_number: normalize_number(&input.invoice_number)?,
            supplier_id: input.supplier_id,
            supplier_name: supplier.name().to_string(),
            branch_id: input.branch_id,
            branch_name: branch.name().to_string(),
            document_date: input.document_date,
            received_date: input.received_date,
            document_type: input.document_type,
            description: input.description.unwrap_or_default(),
            total_amount: input.total_amount,
            amount_paid: 0,
            remaining_balance: input.total_amount,
            status: PaymentStatus::Unpaid,
            payment_history: Vec::new(),
            created_at: now,
        })
    }

    /// Apply one payment: append to history, accumulate, recompute.
    ///
    /// Overpayment is accepted; the balance is clamped at zero.
    pub fn apply_payment(&mut self, payment: PaymentEntry) -> DomainResult<()> {
        if payment.amount == 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }

        let new_paid = self
            .amount_paid
            .checked_add(payment.amount)
            .ok_or_else(|| DomainError::validation("payment amount overflows the invoice total"))?;

        self.payment_history.push(payment);
        self.amount_paid = new_paid;
        self.recompute();
        Ok(())
    }

    /// Apply a direct field edit, then recompute balance and status from the
    /// resulting `(total_amount, amount_paid)` pair.
    pub fn apply_patch(&mut self, patch: InvoicePatch) -> DomainResult<()> {
        let number = match patch.invoice_number {
            Some(ref n) => Some(normalize_number(n)?),
            None => None,
        };

        if let Some(number) = number {
            self.invoice_number = number;
        }
        if let Some(date) = patch.document_date {
            self.document_date = date;
        }
        if let Some(date) = patch.received_date {
            self.received_date = date;
        }
        if let Some(kind) = patch.document_type {
            self.document_type = kind;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(total) = patch.total_amount {
            self.total_amount = total;
        }
        if let Some(paid) = patch.amount_paid {
            self.amount_paid = paid;
        }
        self.recompute();
        Ok(())
    }

    /// Point the invoice at another supplier, copying its current name.
    pub fn reassign_supplier(&mut self, supplier: &Supplier) {
        self.supplier_id = supplier.id_typed();
        self.supplier_name = supplier.name().to_string();
    }

    /// Point the invoice at another branch, copying its current name.
    pub fn reassign_branch(&mut self, branch: &Branch) {
        self.branch_id = branch.id_typed();
        self.branch_name = branch.name().to_string();
    }

    fn recompute(&mut self) {
        self.remaining_balance = self.total_amount.saturating_sub(self.amount_paid);
        self.status = PaymentStatus::derive(self.total_amount, self.amount_paid);
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn document_date(&self) -> NaiveDate {
        self.document_date
    }

    pub fn received_date(&self) -> NaiveDate {
        self.received_date
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn amount_paid(&self) -> u64 {
        self.amount_paid
    }

    pub fn remaining_balance(&self) -> u64 {
        self.remaining_balance
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn payment_history(&self) -> &[PaymentEntry] {
        &self.payment_history
    }
}

impl Record for Invoice {
    const COLLECTION: &'static str = "invoices";
    const KIND: &'static str = "invoice";
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use payables_directory::{NewBranch, NewSupplier};
    use proptest::prelude::*;

    pub(crate) fn test_supplier(name: &str, must_issue_invoice_a: bool) -> Supplier {
        Supplier::register(
            SupplierId::new(),
            NewSupplier {
                name: name.to_string(),
                must_issue_invoice_a: Some(must_issue_invoice_a),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    pub(crate) fn test_branch(name: &str) -> Branch {
        Branch::open(
            BranchId::new(),
            NewBranch {
                name: name.to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    pub(crate) fn issue_for(
        supplier: &Supplier,
        branch: &Branch,
        number: &str,
        document_type: DocumentType,
        total_amount: u64,
    ) -> Invoice {
        let input = NewInvoice {
            supplier_id: supplier.id_typed(),
            branch_id: branch.id_typed(),
            invoice_number: number.to_string(),
            document_date: test_date(),
            received_date: test_date(),
            document_type,
            description: None,
            total_amount,
        };
        Invoice::issue(InvoiceId::new(), input, supplier, branch, Utc::now()).unwrap()
    }

    fn payment(amount: u64) -> PaymentEntry {
        PaymentEntry {
            payment_date: test_date(),
            amount,
            payment_method: PaymentMethod::Cash,
        }
    }

    fn assert_invariants(inv: &Invoice) {
        assert_eq!(
            inv.remaining_balance(),
            inv.total_amount().saturating_sub(inv.amount_paid())
        );
        assert_eq!(inv.status(), PaymentStatus::derive(inv.total_amount(), inv.amount_paid()));
    }

    #[test]
    fn issue_copies_names_and_starts_unpaid() {
        let supplier = test_supplier("Distribuidora Norte", false);
        let branch = test_branch("Calle 59");
        let inv = issue_for(&supplier, &branch, " A-0001 ", DocumentType::InvoiceA, 1000);

        assert_eq!(inv.invoice_number(), "A-0001");
        assert_eq!(inv.supplier_name(), "Distribuidora Norte");
        assert_eq!(inv.branch_name(), "Calle 59");
        assert_eq!(inv.amount_paid(), 0);
        assert_eq!(inv.remaining_balance(), 1000);
        assert_eq!(inv.status(), PaymentStatus::Unpaid);
        assert!(inv.payment_history().is_empty());
    }

    #[test]
    fn issue_rejects_blank_invoice_number() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let input = NewInvoice {
            supplier_id: supplier.id_typed(),
            branch_id: branch.id_typed(),
            invoice_number: "  ".into(),
            document_date: test_date(),
            received_date: test_date(),
            document_type: DocumentType::InvoiceB,
            description: None,
            total_amount: 10,
        };
        let err = Invoice::issue(InvoiceId::new(), input, &supplier, &branch, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn issue_rejects_mismatched_supplier() {
        let supplier = test_supplier("S", false);
        let other = test_supplier("Other", false);
        let branch = test_branch("B");
        let input = NewInvoice {
            supplier_id: other.id_typed(),
            branch_id: branch.id_typed(),
            invoice_number: "X-1".into(),
            document_date: test_date(),
            received_date: test_date(),
            document_type: DocumentType::InvoiceB,
            description: None,
            total_amount: 10,
        };
        assert!(Invoice::issue(InvoiceId::new(), input, &supplier, &branch, Utc::now()).is_err());
    }

    #[test]
    fn partial_then_full_payment_scenario() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-1", DocumentType::InvoiceA, 1000);

        inv.apply_payment(payment(400)).unwrap();
        assert_eq!(inv.amount_paid(), 400);
        assert_eq!(inv.remaining_balance(), 600);
        assert_eq!(inv.status(), PaymentStatus::PartiallyPaid);

        inv.apply_payment(payment(600)).unwrap();
        assert_eq!(inv.amount_paid(), 1000);
        assert_eq!(inv.remaining_balance(), 0);
        assert_eq!(inv.status(), PaymentStatus::Paid);
        assert_eq!(inv.payment_history().len(), 2);
    }

    #[test]
    fn overpayment_is_accepted_and_balance_clamped() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-2", DocumentType::InvoiceC, 500);

        inv.apply_payment(payment(800)).unwrap();
        assert_eq!(inv.amount_paid(), 800);
        assert_eq!(inv.remaining_balance(), 0);
        assert_eq!(inv.status(), PaymentStatus::Paid);
    }

    #[test]
    fn zero_payment_is_rejected_without_history_entry() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-3", DocumentType::InvoiceA, 500);

        let err = inv.apply_payment(payment(0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(inv.payment_history().is_empty());
    }

    #[test]
    fn overflowing_payment_is_rejected() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-4", DocumentType::InvoiceA, 10);
        inv.apply_payment(payment(u64::MAX)).unwrap();

        assert!(inv.apply_payment(payment(1)).is_err());
        assert_eq!(inv.payment_history().len(), 1);
    }

    #[test]
    fn patch_can_move_amount_paid_backward() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-5", DocumentType::InvoiceA, 1000);
        inv.apply_payment(payment(1000)).unwrap();

        inv.apply_patch(InvoicePatch {
            amount_paid: Some(250),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(inv.amount_paid(), 250);
        assert_eq!(inv.remaining_balance(), 750);
        assert_eq!(inv.status(), PaymentStatus::PartiallyPaid);
        // History is an audit of applied payments and is not rewritten.
        assert_eq!(inv.payment_history().len(), 1);
    }

    #[test]
    fn patch_to_zero_paid_is_unpaid() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-6", DocumentType::InvoiceA, 1000);
        inv.apply_payment(payment(300)).unwrap();

        inv.apply_patch(InvoicePatch {
            total_amount: Some(2000),
            amount_paid: Some(0),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(inv.remaining_balance(), 2000);
        assert_eq!(inv.status(), PaymentStatus::Unpaid);
    }

    #[test]
    fn patch_of_total_alone_recomputes_balance() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-7", DocumentType::InvoiceA, 1000);
        inv.apply_payment(payment(400)).unwrap();

        inv.apply_patch(InvoicePatch {
            total_amount: Some(400),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(inv.remaining_balance(), 0);
        assert_eq!(inv.status(), PaymentStatus::Paid);
    }

    #[test]
    fn patch_with_blank_number_changes_nothing() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("B");
        let mut inv = issue_for(&supplier, &branch, "F-8", DocumentType::InvoiceA, 1000);
        let before = inv.clone();

        let err = inv
            .apply_patch(InvoicePatch {
                invoice_number: Some("".into()),
                total_amount: Some(1),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(inv, before);
    }

    #[test]
    fn reassign_branch_copies_new_name() {
        let supplier = test_supplier("S", false);
        let branch = test_branch("Calle 13");
        let other = test_branch("Cocina");
        let mut inv = issue_for(&supplier, &branch, "F-9", DocumentType::InvoiceA, 1);

        inv.reassign_branch(&other);
        assert_eq!(inv.branch_id(), other.id_typed());
        assert_eq!(inv.branch_name(), "Cocina");
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(serde_json::to_value(DocumentType::DeliveryNote).unwrap(), "delivery_note");
        assert_eq!(
            serde_json::to_value(PaymentMethod::BankTransferBbva).unwrap(),
            "bank_transfer_bbva"
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::PartiallyPaid).unwrap(),
            "partially_paid"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of payments, the accumulated amount is
        /// the sum of payments, each payment adds exactly one history entry,
        /// and balance/status follow from (total, paid).
        #[test]
        fn payments_accumulate_and_keep_invariants(
            total in 0u64..1_000_000u64,
            amounts in prop::collection::vec(1u64..500_000u64, 0..12)
        ) {
            let supplier = test_supplier("S", false);
            let branch = test_branch("B");
            let mut inv = issue_for(&supplier, &branch, "P-1", DocumentType::InvoiceA, total);

            let mut expected_paid = 0u64;
            for (i, amount) in amounts.iter().enumerate() {
                inv.apply_payment(payment(*amount)).unwrap();
                expected_paid += amount;

                prop_assert_eq!(inv.amount_paid(), expected_paid);
                prop_assert_eq!(inv.payment_history().len(), i + 1);
                prop_assert_eq!(inv.payment_history()[i].amount, *amount);
                prop_assert_eq!(inv.remaining_balance(), total.saturating_sub(expected_paid));
                prop_assert_eq!(inv.status() == PaymentStatus::Paid, expected_paid >= total);
            }
            assert_invariants(&inv);
        }

        /// Property: a field update leaves balance/status consistent with the
        /// supplied pair, regardless of prior payments.
        #[test]
        fn patch_recomputes_from_supplied_pair(
            total in 0u64..1_000_000u64,
            prior in 0u64..1_000_000u64,
            new_total in prop::option::of(0u64..1_000_000u64),
            new_paid in prop::option::of(0u64..1_000_000u64),
        ) {
            let supplier = test_supplier("S", false);
            let branch = test_branch("B");
            let mut inv = issue_for(&supplier, &branch, "P-2", DocumentType::InvoiceB, total);
            if prior > 0 {
                inv.apply_payment(payment(prior)).unwrap();
            }

            inv.apply_patch(InvoicePatch {
                total_amount: new_total,
                amount_paid: new_paid,
                ..Default::default()
            }).unwrap();

            let t = new_total.unwrap_or(total);
            let p = new_paid.unwrap_or(prior);
            prop_assert_eq!(inv.total_amount(), t);
            prop_assert_eq!(inv.amount_paid(), p);
            prop_assert_eq!(inv.remaining_balance(), t.saturating_sub(p));
            let expected = if p == 0 {
                PaymentStatus::Unpaid
            } else if p >= t {
                PaymentStatus::Paid
            } else {
                PaymentStatus::PartiallyPaid
            };
            prop_assert_eq!(inv.status(), expected);
        }
    }
}
