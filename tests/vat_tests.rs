#![cfg(feature = "vat")]

use std::sync::Arc;

use revisor::core::*;
use revisor::vat::*;
use rust_decimal_macros::dec;

fn store() -> Arc<VatRuleStore> {
    Arc::new(VatRuleStore::danish().unwrap())
}

fn resolver() -> VatResolver {
    VatResolver::new(store(), 1)
}

// ---------------------------------------------------------------------------
// Rule lookup
// ---------------------------------------------------------------------------

#[test]
fn unmatched_description_gets_standard_rate() {
    let rules = store();
    let rule = rules.lookup("Arla Sødmælk 1L");
    assert!(rule.is_default());
    assert_eq!(rule.rate, DANISH_STANDARD_RATE);
    assert_eq!(rule.reason, None);
}

#[test]
fn pant_is_zero_rated() {
    let rules = store();
    for desc in ["Pant", "PANT A", "pant-b", "Coca Cola 1,5L + Pant B"] {
        let rule = rules.lookup(desc);
        assert_eq!(rule.rate, dec!(0), "{desc}");
        assert_eq!(rule.reason, Some(ExemptionReason::DepositReturn), "{desc}");
    }
}

#[test]
fn pant_rule_does_not_match_word_starts() {
    // "pantalon" is clothing at 25%
    assert!(store().lookup("Pantalon sort").is_default());
    assert!(store().lookup("Pantry hylde").is_default());
}

#[test]
fn compound_deposit_and_press_words_are_zero_rated() {
    let rules = store();
    for desc in ["Dåsepant", "Flaskepant 3 stk", "Returpant", "PANTBON"] {
        assert_eq!(rules.lookup(desc).reason, Some(ExemptionReason::DepositReturn), "{desc}");
    }
    assert_eq!(rules.lookup("Søndagsavis").reason, Some(ExemptionReason::Press));
}

#[test]
fn compound_deposit_line_with_zero_vat_passes() {
    let line = LineItemBuilder::new("Dåsepant", dec!(1), dec!(2.00))
        .vat(dec!(0), dec!(0.00))
        .build();
    let v = resolver().resolve(&line, PriceBasis::TaxInclusive);
    assert_eq!(v.rate, dec!(0));
    assert_eq!(v.outcome, VatOutcome::Pass);
    assert_eq!(v.discrepancy, Some(dec!(0)));
}

#[test]
fn newspapers_are_zero_rated() {
    let rules = store();
    assert_eq!(rules.lookup("Politiken søndag").reason, Some(ExemptionReason::Press));
    assert_eq!(rules.lookup("Jyllands-Posten").reason, Some(ExemptionReason::Press));
    assert_eq!(rules.lookup("Dagbladet Børsen").reason, Some(ExemptionReason::Press));
}

#[test]
fn danish_letters_are_folded_before_matching() {
    let rules = store();
    assert_eq!(rules.lookup("Frimærke A-Post").reason, Some(ExemptionReason::Postage));
    assert_eq!(rules.lookup("Tandlæge Hansen").reason, Some(ExemptionReason::Healthcare));
}

#[test]
fn longest_pattern_wins() {
    let rules = VatRuleStore::new(
        dec!(25),
        vec![
            VatRule::new("kort", dec!(25)).label("Card"),
            VatRule::new("rejsekort", dec!(0))
                .reason(ExemptionReason::PassengerTransport)
                .label("Travel card"),
        ],
    )
    .unwrap();
    assert_eq!(rules.lookup("Rejsekort optankning").display_name(), "Travel card");
    assert_eq!(rules.lookup("Gavekort").display_name(), "Card");
}

#[test]
fn equal_length_patterns_keep_load_order() {
    let rules = VatRuleStore::new(
        dec!(25),
        vec![
            VatRule::new("abc", dec!(0)).label("first"),
            VatRule::new("bcd", dec!(12)).label("second"),
        ],
    )
    .unwrap();
    assert_eq!(rules.lookup("abcd").display_name(), "first");
}

#[test]
fn lookup_is_deterministic() {
    let rules = store();
    let a = rules.lookup("Berlingske weekend").clone();
    let b = rules.lookup("Berlingske weekend").clone();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Rule data
// ---------------------------------------------------------------------------

#[test]
fn malformed_rule_json_is_fatal() {
    let err = VatRuleStore::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, AuditorError::RuleData(_)));
}

#[test]
fn out_of_range_rate_is_fatal() {
    let json = r#"{"standard_rate":"25","rules":[{"pattern":"x","rate":"125"}]}"#;
    let err = VatRuleStore::from_json_str(json).unwrap_err();
    assert!(err.to_string().contains("outside 0-100"));
}

#[test]
fn duplicate_pattern_is_fatal() {
    let json = r#"{"standard_rate":"25","rules":[
        {"pattern":"Avis","rate":"0"},
        {"pattern":"avis","rate":"0"}
    ]}"#;
    assert!(VatRuleStore::from_json_str(json).is_err());
}

#[test]
fn blank_pattern_is_fatal() {
    let json = r#"{"standard_rate":"25","rules":[{"pattern":" - ","rate":"0"}]}"#;
    assert!(VatRuleStore::from_json_str(json).is_err());
}

#[test]
fn missing_rule_file_is_io_error() {
    let err = VatRuleStore::load("/nonexistent/revisor/rules.json").unwrap_err();
    assert!(matches!(err, AuditorError::Io(_)));
}

#[test]
fn custom_rule_extends_a_copy() {
    let base = store();
    let learned = base
        .with_rule(
            VatRule::new("kursusgebyr", dec!(0))
                .reason(ExemptionReason::Education)
                .label("Course fee"),
        )
        .unwrap();

    assert_eq!(learned.len(), base.len() + 1);
    assert_eq!(learned.lookup("Kursusgebyr maj").display_name(), "Course fee");
    // original store untouched
    assert_ne!(base.lookup("Kursusgebyr maj").display_name(), "Course fee");
}

#[test]
fn custom_rule_duplicate_rejected() {
    assert!(store().with_rule(VatRule::new("pant", dec!(0)).suffix()).is_err());
}

#[test]
fn rule_file_save_and_load() {
    let path = std::env::temp_dir().join(format!("revisor-rules-{}.json", std::process::id()));
    let rules = store()
        .with_rule(VatRule::new("havnepenge", dec!(0)).reason(ExemptionReason::Other))
        .unwrap();
    rules.save(&path).unwrap();

    let loaded = VatRuleStore::load(&path).unwrap();
    assert_eq!(loaded.len(), rules.len());
    assert_eq!(
        loaded.rules().collect::<Vec<_>>(),
        rules.rules().collect::<Vec<_>>()
    );
    std::fs::remove_file(&path).unwrap();
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn exempt_line_declared_zero_passes_at_any_scale() {
    let r = resolver();
    for declared in [dec!(0), dec!(0.0), dec!(0.00)] {
        let line = LineItemBuilder::new("Pant", dec!(1), dec!(2.00))
            .vat(dec!(0), declared)
            .build();
        let v = r.resolve(&line, PriceBasis::TaxInclusive);
        assert_eq!(v.outcome, VatOutcome::Pass, "declared {declared}");
        assert_eq!(v.expected_vat, dec!(0.00));
        assert_eq!(v.discrepancy, Some(dec!(0.00)));
    }
}

#[test]
fn exempt_line_with_vat_fails() {
    let line = LineItemBuilder::new("Pant", dec!(1), dec!(100.00))
        .vat(dec!(25), dec!(25.00))
        .build();
    let v = resolver().resolve(&line, PriceBasis::TaxExclusive);
    assert_eq!(v.outcome, VatOutcome::Fail);
    assert_eq!(v.discrepancy.map(|d| d.abs()), Some(dec!(25.00)));
}

#[test]
fn tax_exclusive_standard_line() {
    let line = LineItemBuilder::new("Konsulentydelse", dec!(1), dec!(100.00))
        .vat(dec!(25), dec!(25.00))
        .build();
    let v = resolver().resolve(&line, PriceBasis::TaxExclusive);
    assert_eq!(v.expected_vat, dec!(25.00));
    assert_eq!(v.outcome, VatOutcome::Pass);
}

#[test]
fn tax_inclusive_split_receipt() {
    // Supermarket receipt: two standard lines, one pant line
    let r = resolver();
    let lines = [
        LineItemBuilder::new("Coca Cola 1,5L", dec!(2), dec!(15.00))
            .vat_amount(dec!(6.00))
            .build(),
        LineItemBuilder::new("Pant B", dec!(2), dec!(3.00))
            .vat_amount(dec!(0.00))
            .build(),
        LineItemBuilder::new("Rugbrød", dec!(1), dec!(22.95))
            .vat_amount(dec!(4.59))
            .build(),
    ];
    let verdicts: Vec<_> = lines
        .iter()
        .map(|l| r.resolve(l, PriceBasis::TaxInclusive))
        .collect();
    assert!(verdicts.iter().all(VatVerdict::passed));
    assert_eq!(verdicts[1].exemption, Some(ExemptionReason::DepositReturn));
}

#[test]
fn zero_decimal_currency() {
    // 1000 JPY excl. 25% -> 250, tolerance 1 yen
    let line = LineItemBuilder::new("Tjeneste", dec!(1), dec!(1000))
        .vat_amount(dec!(251))
        .build();
    let v = resolver().resolve_with(&line, PriceBasis::TaxExclusive, 0);
    assert_eq!(v.expected_vat, dec!(250));
    assert_eq!(v.tolerance, dec!(1));
    assert!(v.passed());
}

#[test]
fn wider_tolerance() {
    let r = VatResolver::new(store(), 5);
    let line = LineItemBuilder::new("Kaffe", dec!(1), dec!(20.00))
        .vat_amount(dec!(4.05))
        .build();
    assert!(r.resolve(&line, PriceBasis::TaxInclusive).passed());
}
