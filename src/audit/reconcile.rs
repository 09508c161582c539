//! Invoice-level VAT reconciliation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::vat::{VatOutcome, VatVerdict};

/// Sum of per-line expected VAT compared with the declared VAT total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatReconciliation {
    pub expected_total: Decimal,
    pub declared_total: Option<Decimal>,
    /// `expected_total - declared_total`, when both are known.
    pub difference: Option<Decimal>,
    pub tolerance: Decimal,
    /// `Unverifiable` when no total was declared.
    pub outcome: VatOutcome,
}

impl VatReconciliation {
    pub fn passed(&self) -> bool {
        self.outcome == VatOutcome::Pass
    }
}

/// Reconcile line verdicts against the declared total.
///
/// The tolerance grows with the number of lines, since each line may be
/// rounded by up to `line_tolerance`, but is never below one `minor_unit`.
pub fn reconcile(
    verdicts: &[VatVerdict],
    declared_total: Option<Decimal>,
    line_tolerance: Decimal,
    minor_unit: Decimal,
) -> VatReconciliation {
    let expected_total = verdicts
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.expected_vat));
    let scaled = Decimal::from(verdicts.len()).checked_mul(line_tolerance);
    let tolerance = scaled.map_or(minor_unit, |t| t.max(minor_unit));

    let (difference, outcome) = match (expected_total, declared_total) {
        (_, None) => (None, VatOutcome::Unverifiable),
        (Some(expected), Some(declared)) => match expected.checked_sub(declared) {
            Some(d) if d.abs() <= tolerance => (Some(d), VatOutcome::Pass),
            Some(d) => (Some(d), VatOutcome::Fail),
            None => (None, VatOutcome::Fail),
        },
        (None, Some(_)) => (None, VatOutcome::Fail),
    };

    VatReconciliation {
        expected_total: expected_total.unwrap_or(Decimal::MAX),
        declared_total,
        difference,
        tolerance,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn verdict(expected: Decimal) -> VatVerdict {
        VatVerdict {
            rule: "Standard rate (25%)".into(),
            rate: dec!(25),
            exemption: None,
            expected_vat: expected,
            declared_vat: None,
            declared_rate: None,
            discrepancy: None,
            tolerance: dec!(0.01),
            outcome: VatOutcome::Unverifiable,
            integrity_issues: Vec::new(),
        }
    }

    #[test]
    fn sums_and_passes() {
        let lines = [verdict(dec!(25.00)), verdict(dec!(0.00)), verdict(dec!(4.40))];
        let r = reconcile(&lines, Some(dec!(29.40)), dec!(0.01), dec!(0.01));
        assert_eq!(r.expected_total, dec!(29.40));
        assert_eq!(r.difference, Some(dec!(0.00)));
        assert_eq!(r.tolerance, dec!(0.03));
        assert!(r.passed());
    }

    #[test]
    fn tolerance_scales_with_line_count() {
        let lines = [verdict(dec!(1.00)), verdict(dec!(1.00)), verdict(dec!(1.00))];
        let r = reconcile(&lines, Some(dec!(3.03)), dec!(0.01), dec!(0.01));
        assert!(r.passed());
        let r = reconcile(&lines, Some(dec!(3.04)), dec!(0.01), dec!(0.01));
        assert_eq!(r.outcome, VatOutcome::Fail);
        assert_eq!(r.difference, Some(dec!(-0.04)));
    }

    #[test]
    fn tolerance_floor_is_one_minor_unit() {
        let r = reconcile(&[], Some(dec!(0.01)), dec!(0.01), dec!(0.01));
        assert_eq!(r.tolerance, dec!(0.01));
        assert!(r.passed());
    }

    #[test]
    fn missing_total_is_unverifiable() {
        let r = reconcile(&[verdict(dec!(25))], None, dec!(0.01), dec!(0.01));
        assert_eq!(r.outcome, VatOutcome::Unverifiable);
        assert_eq!(r.difference, None);
    }
}
