use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{NaiveDate, Utc};
use payables_core::{BranchId, InvoiceId, SupplierId};
use payables_directory::{Branch, NewBranch, NewSupplier, Supplier};
use payables_invoicing::{
    detect_discrepancies, DocumentType, Invoice, InvoiceFilter, InvoiceTotals, NewInvoice,
    PaymentEntry, PaymentMethod, Period,
};

const DOCUMENT_TYPES: [DocumentType; 4] = [
    DocumentType::InvoiceA,
    DocumentType::InvoiceB,
    DocumentType::InvoiceC,
    DocumentType::DeliveryNote,
];

struct Fixture {
    suppliers: Vec<Supplier>,
    invoices: Vec<Invoice>,
}

/// Build `n` invoices spread over 50 suppliers (every third one flagged) and 4 branches.
fn fixture(n: usize) -> Fixture {
    let now = Utc::now();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let suppliers: Vec<Supplier> = (0..50)
        .map(|i| {
            Supplier::register(
                SupplierId::new(),
                NewSupplier {
                    name: format!("Proveedor {i}"),
                    must_issue_invoice_a: Some(i % 3 == 0),
                    ..Default::default()
                },
                now,
            )
            .unwrap()
        })
        .collect();

    let branches: Vec<Branch> = ["Calle 59", "Calle 50", "Calle 13", "Cocina"]
        .iter()
        .map(|name| {
            Branch::open(
                BranchId::new(),
                NewBranch {
                    name: name.to_string(),
                    ..Default::default()
                },
                now,
            )
            .unwrap()
        })
        .collect();

    let invoices = (0..n)
        .map(|i| {
            let supplier = &suppliers[i % suppliers.len()];
            let branch = &branches[i % branches.len()];
            let mut inv = Invoice::issue(
                InvoiceId::new(),
                NewInvoice {
                    supplier_id: supplier.id_typed(),
                    branch_id: branch.id_typed(),
                    invoice_number: format!("N-{i:06}"),
                    document_date: date,
                    received_date: date,
                    document_type: DOCUMENT_TYPES[i % DOCUMENT_TYPES.len()],
                    description: Some(format!("entrega {i}")),
                    total_amount: 10_000 + i as u64,
                },
                supplier,
                branch,
                now,
            )
            .unwrap();
            if i % 2 == 0 {
                inv.apply_payment(PaymentEntry {
                    payment_date: date,
                    amount: 5_000,
                    payment_method: PaymentMethod::Cash,
                })
                .unwrap();
            }
            inv
        })
        .collect();

    Fixture { suppliers, invoices }
}

fn bench_discrepancy_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("discrepancy_detection");

    for size in [1_000usize, 10_000, 50_000].iter() {
        let fx = fixture(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(detect_discrepancies(&fx.invoices, &fx.suppliers).len()));
        });
    }

    group.finish();
}

fn bench_filter_and_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_totals");
    let filter = InvoiceFilter {
        search: Some("proveedor 1".into()),
        period: Some(Period::Month),
        discrepancies_only: true,
        ..Default::default()
    };

    for size in [1_000usize, 10_000, 50_000].iter() {
        let fx = fixture(*size);
        let now = Utc::now();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let rows = filter.apply(&fx.invoices, &fx.suppliers, now);
                black_box(InvoiceTotals::of(rows.iter().copied()))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_discrepancy_detection, bench_filter_and_totals);
criterion_main!(benches);
