use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use revisor::audit::{classify, reconcile};
use revisor::core::*;
use revisor::cvr::validate_cvr_format;
use revisor::vat::*;

const DESCRIPTIONS: [&str; 8] = [
    "Arla Sødmælk 1L",
    "Coca Cola 1,5L",
    "Pant B",
    "Politiken søndag",
    "Frimærke A-Post",
    "Rugbrød",
    "Kaffe Merrild 500g",
    "Rejsekort optankning",
];

fn receipt(lines: usize) -> ExtractedInvoice {
    let mut builder = InvoiceBuilder::new(PriceBasis::TaxInclusive).vendor("Netto", "35954716");
    for i in 0..lines {
        let desc = DESCRIPTIONS[i % DESCRIPTIONS.len()];
        builder = builder.add_line(
            LineItemBuilder::new(desc, dec!(1), dec!(19.95))
                .vat_amount(dec!(3.99))
                .build(),
        );
    }
    builder.build()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_description", |b| {
        b.iter(|| {
            for d in DESCRIPTIONS {
                black_box(normalize_description(black_box(d)));
            }
        });
    });
}

fn bench_rule_lookup(c: &mut Criterion) {
    let rules = VatRuleStore::danish().unwrap();
    c.bench_function("rule_lookup_8_descriptions", |b| {
        b.iter(|| {
            for d in DESCRIPTIONS {
                black_box(rules.lookup(black_box(d)));
            }
        });
    });
}

fn bench_resolve_receipt(c: &mut Criterion) {
    let resolver = VatResolver::new(Arc::new(VatRuleStore::danish().unwrap()), 1);
    let invoice = receipt(40);
    c.bench_function("resolve_and_reconcile_40_lines", |b| {
        b.iter(|| {
            let verdicts: Vec<_> = invoice
                .lines
                .iter()
                .map(|l| resolver.resolve(black_box(l), invoice.price_basis))
                .collect();
            black_box(reconcile(&verdicts, Some(dec!(100)), dec!(0.01), dec!(0.01)))
        });
    });
}

fn bench_resolve_1000_lines(c: &mut Criterion) {
    let resolver = VatResolver::new(Arc::new(VatRuleStore::danish().unwrap()), 1);
    let invoice = receipt(1000);
    c.bench_function("resolve_1000_lines", |b| {
        b.iter(|| {
            for line in &invoice.lines {
                black_box(resolver.resolve(line, invoice.price_basis));
            }
        });
    });
}

fn bench_cvr_format(c: &mut Criterion) {
    c.bench_function("cvr_format", |b| {
        b.iter(|| {
            black_box(validate_cvr_format(black_box("DK 35 95 47 16")).is_ok());
            black_box(validate_cvr_format(black_box("47458715")).is_err());
        });
    });
}

fn bench_classify(c: &mut Criterion) {
    let findings: Vec<Finding> = (0..50)
        .map(|i| {
            Finding::for_line(
                i,
                Severity::Warning,
                FindingCategory::Uncertainty,
                "vat_amount",
                "no VAT amount declared",
            )
        })
        .collect();
    c.bench_function("classify_50_findings", |b| {
        b.iter(|| black_box(classify(black_box(&findings))));
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_rule_lookup,
    bench_resolve_receipt,
    bench_resolve_1000_lines,
    bench_cvr_format,
    bench_classify,
);
criterion_main!(benches);
