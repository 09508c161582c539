//! Audit a receipt JSON file against the live CVR registry.
//!
//! ```sh
//! RUST_LOG=revisor=debug cargo run --example audit_receipt --features all -- receipt.json
//! ```
//!
//! Without an argument a built-in supermarket receipt is audited. The CVR
//! cache is persisted to `revisor-cache.json` between runs.

use std::sync::Arc;

use revisor::audit::Auditor;
use revisor::core::*;
use revisor::cvr::{CvrApiClient, CvrCache};
use revisor::vat::VatRuleStore;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

const CACHE_PATH: &str = "revisor-cache.json";

fn sample_receipt() -> ExtractedInvoice {
    InvoiceBuilder::new(PriceBasis::TaxInclusive)
        .vendor("Netto", "35954716")
        .total_vat(dec!(11.57))
        .total_amount(dec!(63.85))
        .add_line(
            LineItemBuilder::new("Coca Cola 1,5L", dec!(2), dec!(15.00))
                .vat(dec!(25), dec!(6.00))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("Pant B", dec!(2), dec!(3.00))
                .vat(dec!(0), dec!(0.00))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("Rugbrød", dec!(1), dec!(27.85))
                .vat_amount(dec!(5.57))
                .build(),
        )
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let invoice = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => sample_receipt(),
    };

    let config = AuditConfig::from_env()?;
    let cache = Arc::new(CvrCache::load(CACHE_PATH, &config)?);
    let auditor = Auditor::new(
        Arc::new(VatRuleStore::danish()?),
        cache.clone(),
        CvrApiClient::new(&config)?,
        config,
    )?;

    let result = auditor.audit(&invoice).await;

    println!("Status: {}\n", result.status);
    for line in &result.lines {
        let v = &line.verdict;
        println!(
            "  [{}] {:<24} {:>6}%  expected {:>8}  {:?}",
            line.index, line.description, v.rate, v.expected_vat, v.outcome
        );
    }
    if let Some(cvr) = &result.cvr {
        println!("\n  CVR {}: {} ({:?})", cvr.cvr, cvr.status, cvr.source);
    }
    println!(
        "  VAT total: expected {}, declared {}",
        result.reconciliation.expected_total,
        result
            .reconciliation
            .declared_total
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into())
    );
    if !result.findings.is_empty() {
        println!("\nFindings:");
        for f in &result.findings {
            println!("  {f}");
        }
    }

    cache.save(CACHE_PATH)?;
    Ok(())
}
