//! Per-line VAT resolution and verification.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::rules::{ExemptionReason, VatRuleStore};
use crate::core::{LineItem, PriceBasis};

/// Minor-unit digits assumed when no currency is given.
const DEFAULT_MINOR_DIGITS: u32 = 2;

/// Result of checking a line's declared VAT against the rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatOutcome {
    /// Declared VAT is within tolerance of the expected amount.
    Pass,
    /// Declared VAT deviates by more than the tolerance.
    Fail,
    /// No VAT amount was declared, so nothing could be compared.
    Unverifiable,
}

/// A line value that cannot be right, whatever the VAT rules say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    NonPositiveQuantity { quantity: Decimal },
    NegativeLineTotal { line_total: Decimal },
    /// Amount too large to compute with.
    AmountOutOfRange,
}

impl IntegrityIssue {
    /// Name of the offending field on the line.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity { .. } => "quantity",
            Self::NegativeLineTotal { .. } | Self::AmountOutOfRange => "line_total",
        }
    }
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveQuantity { quantity } => {
                write!(f, "quantity {quantity} must be positive")
            }
            Self::NegativeLineTotal { line_total } => {
                write!(f, "line total {line_total} must not be negative")
            }
            Self::AmountOutOfRange => f.write_str("amount is out of computable range"),
        }
    }
}

/// Outcome of resolving one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatVerdict {
    /// Label of the rule that applied.
    pub rule: String,
    /// Resolved VAT rate in percent.
    pub rate: Decimal,
    pub exemption: Option<ExemptionReason>,
    /// VAT the line should carry, rounded to the minor unit.
    pub expected_vat: Decimal,
    pub declared_vat: Option<Decimal>,
    /// Declared rate in percent (fractions such as 0.25 are scaled up).
    pub declared_rate: Option<Decimal>,
    /// `expected_vat - declared_vat`, when both are known.
    pub discrepancy: Option<Decimal>,
    /// Allowed absolute discrepancy.
    pub tolerance: Decimal,
    pub outcome: VatOutcome,
    pub integrity_issues: Vec<IntegrityIssue>,
}

impl VatVerdict {
    pub fn passed(&self) -> bool {
        self.outcome == VatOutcome::Pass
    }

    /// True unless a declared rate contradicts the resolved rate.
    pub fn rate_matches(&self) -> bool {
        self.declared_rate.is_none_or(|r| r == self.rate)
    }
}

/// Resolves the VAT treatment of line items and checks their tax math.
///
/// Resolution is a pure function of the item and the rule store: the
/// same item always yields the same verdict.
#[derive(Debug, Clone)]
pub struct VatResolver {
    rules: Arc<VatRuleStore>,
    tolerance_units: u32,
}

impl VatResolver {
    /// `tolerance_units` is the per-line tolerance in minor currency units.
    pub fn new(rules: Arc<VatRuleStore>, tolerance_units: u32) -> Self {
        Self {
            rules,
            tolerance_units,
        }
    }

    pub fn rules(&self) -> &VatRuleStore {
        &self.rules
    }

    /// Per-line tolerance for a currency with `minor_digits` decimals.
    pub fn line_tolerance(&self, minor_digits: u32) -> Decimal {
        Decimal::new(i64::from(self.tolerance_units), minor_digits)
    }

    /// Resolve a line in a two-decimal currency.
    pub fn resolve(&self, item: &LineItem, basis: PriceBasis) -> VatVerdict {
        self.resolve_with(item, basis, DEFAULT_MINOR_DIGITS)
    }

    /// Resolve a line in a currency with `minor_digits` decimals.
    pub fn resolve_with(&self, item: &LineItem, basis: PriceBasis, minor_digits: u32) -> VatVerdict {
        let rule = self.rules.lookup(&item.description);
        let tolerance = self.line_tolerance(minor_digits);

        let mut integrity_issues = Vec::new();
        if item.quantity <= Decimal::ZERO {
            integrity_issues.push(IntegrityIssue::NonPositiveQuantity {
                quantity: item.quantity,
            });
        }
        if item.line_total.is_sign_negative() && !item.line_total.is_zero() {
            integrity_issues.push(IntegrityIssue::NegativeLineTotal {
                line_total: item.line_total,
            });
        }

        let declared_rate = item.vat_rate.map(rate_as_percent);
        let expected_vat = match expected_vat(item.line_total, rule.rate, basis, minor_digits) {
            Some(v) => v,
            None => {
                integrity_issues.push(IntegrityIssue::AmountOutOfRange);
                Decimal::ZERO
            }
        };

        // A declared 0% on a zero-rated line needs no stated amount.
        let declared_vat = item.vat_amount.or_else(|| {
            (rule.rate.is_zero() && declared_rate.is_some_and(|r| r.is_zero()))
                .then_some(Decimal::ZERO)
        });

        let (discrepancy, outcome) = match declared_vat {
            None => (None, VatOutcome::Unverifiable),
            Some(declared) => match expected_vat.checked_sub(declared) {
                Some(d) if d.abs() <= tolerance => (Some(d), VatOutcome::Pass),
                Some(d) => (Some(d), VatOutcome::Fail),
                None => (None, VatOutcome::Fail),
            },
        };

        VatVerdict {
            rule: rule.display_name().to_string(),
            rate: rule.rate,
            exemption: rule.reason,
            expected_vat,
            declared_vat,
            declared_rate,
            discrepancy,
            tolerance,
            outcome,
            integrity_issues,
        }
    }
}

/// VAT contained in (tax-inclusive) or owed on (tax-exclusive) `total` at
/// `rate` percent, rounded half away from zero to `minor_digits`.
///
/// Returns `None` if the amount is too large to compute.
pub fn expected_vat(
    total: Decimal,
    rate: Decimal,
    basis: PriceBasis,
    minor_digits: u32,
) -> Option<Decimal> {
    let taxed = total.checked_mul(rate)?;
    let denominator = match basis {
        PriceBasis::TaxExclusive => Decimal::ONE_HUNDRED,
        PriceBasis::TaxInclusive => Decimal::ONE_HUNDRED.checked_add(rate)?,
    };
    let vat = taxed.checked_div(denominator)?;
    Some(vat.round_dp_with_strategy(minor_digits, RoundingStrategy::MidpointAwayFromZero))
}

/// Read a declared rate as percent. Extraction sometimes reports 25% as
/// 0.25; values strictly between 0 and 1 are treated as fractions.
fn rate_as_percent(rate: Decimal) -> Decimal {
    if rate > Decimal::ZERO && rate < Decimal::ONE {
        rate * Decimal::ONE_HUNDRED
    } else {
        rate
    }
}
