#![cfg(feature = "core")]

use chrono::NaiveDate;
use revisor::core::*;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Builders and the extracted-invoice model
// ---------------------------------------------------------------------------

#[test]
fn builder_defaults() {
    let invoice = InvoiceBuilder::new(PriceBasis::TaxInclusive).build();
    assert_eq!(invoice.currency_code, "DKK");
    assert!(invoice.vendor_cvr.is_none());
    assert!(invoice.lines.is_empty());
}

#[test]
fn line_total_defaults_to_quantity_times_price() {
    let line = LineItemBuilder::new("Rugbrød", dec!(3), dec!(22.95)).build();
    assert_eq!(line.line_total, dec!(68.85));
    assert_eq!(line.vat_rate, None);
    assert_eq!(line.vat_amount, None);
}

#[test]
fn full_invoice() {
    let invoice = InvoiceBuilder::new(PriceBasis::TaxExclusive)
        .vendor("LEGO A/S", "47458714")
        .issue_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        .currency("EUR")
        .exchange_rate(dec!(7.46))
        .total_vat(dec!(50.00))
        .total_amount(dec!(250.00))
        .add_line(
            LineItemBuilder::new("Klodser", dec!(2), dec!(100.00))
                .vat(dec!(25), dec!(50.00))
                .build(),
        )
        .build();
    assert_eq!(invoice.vendor_name.as_deref(), Some("LEGO A/S"));
    assert_eq!(invoice.lines[0].line_total, dec!(200.00));
    assert_eq!(invoice.exchange_rate, Some(dec!(7.46)));
}

#[test]
fn invoice_json_uses_string_decimals() {
    let invoice = InvoiceBuilder::new(PriceBasis::TaxInclusive)
        .vendor_name("Netto")
        .total_vat(dec!(4.00))
        .add_line(
            LineItemBuilder::new("Kaffe", dec!(1), dec!(20.00))
                .vat_amount(dec!(4.00))
                .build(),
        )
        .build();
    let json = serde_json::to_value(&invoice).unwrap();
    assert_eq!(json["price_basis"], "tax_inclusive");
    assert_eq!(json["total_vat"], "4.00");
    assert_eq!(json["lines"][0]["line_total"], "20.00");

    let back: ExtractedInvoice = serde_json::from_value(json).unwrap();
    assert_eq!(back, invoice);
}

#[test]
fn invoice_json_optional_fields_default() {
    let invoice: ExtractedInvoice = serde_json::from_str(
        r#"{"currency_code":"DKK","price_basis":"tax_exclusive","lines":[]}"#,
    )
    .unwrap();
    assert_eq!(invoice.total_vat, None);
    assert_eq!(invoice.issue_date, None);
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

#[test]
fn severity_order() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Critical);
}

#[test]
fn finding_serde() {
    let f = Finding::new(
        Severity::Critical,
        FindingCategory::ComplianceViolation,
        "total_vat",
        "declared total VAT 30.00 does not match line VAT 25.00",
    );
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["severity"], "critical");
    assert_eq!(json["category"], "compliance_violation");
    assert!(json["line"].is_null());
}

// ---------------------------------------------------------------------------
// Currencies
// ---------------------------------------------------------------------------

#[test]
fn minor_units() {
    assert_eq!(minor_unit("DKK"), Some(dec!(0.01)));
    assert_eq!(minor_unit("JPY"), Some(dec!(1)));
    assert_eq!(minor_unit("KWD"), Some(dec!(0.001)));
    assert!(!is_known_currency_code("dkk"));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("revisor-config-{}.json", std::process::id()));
    let config = AuditConfig {
        home_currency: "EUR".into(),
        freshness: Freshness::MaxAge { hours: 12 },
        max_retries: 0,
        ..AuditConfig::default()
    };
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    assert_eq!(AuditConfig::load(&path).unwrap(), config);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn config_rejects_bad_values() {
    for json in [
        r#"{"registry_url": "ftp://cvrapi.dk"}"#,
        r#"{"request_timeout_ms": 0}"#,
        r#"{"cache_capacity": 0}"#,
        r#"{"freshness": {"policy": "max_age", "hours": 0}}"#,
        r#"{"line_tolerance_minor_units": -1}"#,
    ] {
        let err = AuditConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, AuditorError::Config(_)), "{json}");
    }
}

#[test]
fn missing_config_file_is_io_error() {
    let err = AuditConfig::load("/nonexistent/revisor.json").unwrap_err();
    assert!(matches!(err, AuditorError::Io(_)));
}
