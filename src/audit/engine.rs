//! The audit decision engine.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use super::classify::classify;
use super::reconcile::{VatReconciliation, reconcile};
use super::result::{AuditResult, LineVerdict};
use crate::core::{
    AuditConfig, AuditorError, ExtractedInvoice, Finding, FindingCategory, Severity,
    minor_unit_digits,
};
use crate::cvr::{CvrCache, CvrValidator, CvrVerdict, RegistryClient};
use crate::vat::{VatOutcome, VatResolver, VatRuleStore, VatVerdict};

/// Minor-unit digits assumed for unrecognised currency codes.
const FALLBACK_MINOR_DIGITS: u32 = 2;

/// Audits extracted invoices: VAT per line, vendor CVR, totals.
///
/// Construction is the only fallible step. Once built, an auditor turns any
/// well-formed [`ExtractedInvoice`] into an [`AuditResult`]; bad or missing
/// data degrades the status to Review or Red instead of returning an error.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use revisor::audit::{AuditStatus, Auditor};
/// use revisor::core::*;
/// use revisor::cvr::*;
/// use revisor::vat::VatRuleStore;
/// use rust_decimal_macros::dec;
///
/// struct AlwaysActive;
///
/// impl RegistryClient for AlwaysActive {
///     async fn fetch_registry_status(&self, _: &Cvr) -> Result<RegistryEntry, RegistryError> {
///         Ok(RegistryEntry::new(RegistryStatus::Active, Some("Netto A/S".into())))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), AuditorError> {
/// let config = AuditConfig::default();
/// let auditor = Auditor::new(
///     Arc::new(VatRuleStore::danish()?),
///     Arc::new(CvrCache::from_config(&config)),
///     AlwaysActive,
///     config,
/// )?;
///
/// let receipt = InvoiceBuilder::new(PriceBasis::TaxInclusive)
///     .vendor("Netto", "35954716")
///     .total_vat(dec!(4.00))
///     .add_line(LineItemBuilder::new("Kaffe", dec!(1), dec!(20.00)).vat_amount(dec!(4.00)).build())
///     .build();
/// let result = auditor.audit(&receipt).await;
/// assert_eq!(result.status, AuditStatus::Green);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Auditor<R> {
    resolver: VatResolver,
    validator: CvrValidator<R>,
    config: AuditConfig,
}

impl<R: RegistryClient> Auditor<R> {
    /// Build an auditor from shared rules and cache.
    ///
    /// Fails only if `config` is invalid.
    pub fn new(
        rules: Arc<VatRuleStore>,
        cache: Arc<CvrCache>,
        registry: R,
        config: AuditConfig,
    ) -> Result<Self, AuditorError> {
        config.validate()?;
        Ok(Self {
            resolver: VatResolver::new(rules, config.line_tolerance_minor_units),
            validator: CvrValidator::new(registry, cache, config.clone()),
            config,
        })
    }

    pub fn resolver(&self) -> &VatResolver {
        &self.resolver
    }

    pub fn validator(&self) -> &CvrValidator<R> {
        &self.validator
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub async fn audit(&self, invoice: &ExtractedInvoice) -> AuditResult {
        self.audit_at(invoice, Utc::now()).await
    }

    /// Audit as of `now`, which decides CVR cache freshness.
    pub async fn audit_at(&self, invoice: &ExtractedInvoice, now: DateTime<Utc>) -> AuditResult {
        self.audit_until_at(invoice, now, std::future::pending::<()>()).await
    }

    /// Audit, abandoning the registry lookup after `limit`.
    pub async fn audit_with_timeout(&self, invoice: &ExtractedInvoice, limit: Duration) -> AuditResult {
        self.audit_until(invoice, tokio::time::sleep(limit)).await
    }

    /// Audit, abandoning the registry lookup once `cancel` completes.
    ///
    /// An abandoned lookup falls back to the cached record for the vendor,
    /// or `Unreachable` if there is none. The cache is left untouched.
    pub async fn audit_until<F>(&self, invoice: &ExtractedInvoice, cancel: F) -> AuditResult
    where
        F: Future<Output = ()>,
    {
        self.audit_until_at(invoice, Utc::now(), cancel).await
    }

    pub async fn audit_until_at<F>(
        &self,
        invoice: &ExtractedInvoice,
        now: DateTime<Utc>,
        cancel: F,
    ) -> AuditResult
    where
        F: Future<Output = ()>,
    {
        let currency = invoice.currency_code.trim().to_ascii_uppercase();
        let known_digits = minor_unit_digits(&currency);
        let digits = known_digits.unwrap_or(FALLBACK_MINOR_DIGITS);

        let lines = async {
            invoice
                .lines
                .iter()
                .map(|line| self.resolver.resolve_with(line, invoice.price_basis, digits))
                .collect::<Vec<_>>()
        };
        let vendor = self.check_vendor(invoice.vendor_cvr.as_deref(), now, cancel);
        let (verdicts, cvr) = tokio::join!(lines, vendor);

        let reconciliation = reconcile(
            &verdicts,
            invoice.total_vat,
            self.resolver.line_tolerance(digits),
            Decimal::new(1, digits),
        );

        let mut findings = Vec::new();
        let total_amount_home =
            self.currency_findings(invoice, &currency, known_digits.is_some(), &mut findings);
        if invoice.lines.is_empty() {
            findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::DataIntegrity,
                "lines",
                "invoice has no line items",
            ));
        }
        for (index, verdict) in verdicts.iter().enumerate() {
            line_findings(index, verdict, &mut findings);
        }
        match &cvr {
            Some(verdict) => findings.extend(verdict.findings()),
            None => findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::Uncertainty,
                "vendor_cvr",
                "invoice carries no vendor CVR number",
            )),
        }
        reconciliation_findings(&reconciliation, &mut findings);

        let status = classify(&findings);
        tracing::info!(
            vendor = invoice.vendor_name.as_deref().unwrap_or("-"),
            %status,
            lines = verdicts.len(),
            findings = findings.len(),
            "audit complete"
        );

        AuditResult {
            status,
            currency,
            lines: invoice
                .lines
                .iter()
                .zip(verdicts)
                .enumerate()
                .map(|(index, (line, verdict))| LineVerdict {
                    index,
                    description: line.description.clone(),
                    verdict,
                })
                .collect(),
            cvr,
            reconciliation,
            findings,
            total_amount_home,
        }
    }

    async fn check_vendor<F>(
        &self,
        raw: Option<&str>,
        now: DateTime<Utc>,
        cancel: F,
    ) -> Option<CvrVerdict>
    where
        F: Future<Output = ()>,
    {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        let lookup = self.validator.validate_at(raw, now);
        tokio::pin!(lookup);
        tokio::pin!(cancel);

        let verdict = tokio::select! {
            biased;
            verdict = &mut lookup => verdict,
            () = &mut cancel => {
                tracing::warn!(cvr = raw, "CVR lookup abandoned, using cached data");
                self.validator.fallback_at(raw, now, "lookup cancelled before the registry answered")
            }
        };
        Some(verdict)
    }

    /// Currency checks; returns the total in the home currency when known.
    fn currency_findings(
        &self,
        invoice: &ExtractedInvoice,
        currency: &str,
        known: bool,
        findings: &mut Vec<Finding>,
    ) -> Option<Decimal> {
        let home = self.config.home_currency.as_str();
        if !known {
            findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::DataIntegrity,
                "currency_code",
                format!("unknown currency code '{currency}', assuming {FALLBACK_MINOR_DIGITS} decimal places"),
            ));
            return None;
        }
        if currency == home {
            return invoice.total_amount;
        }

        match invoice.exchange_rate {
            Some(rate) if rate > Decimal::ZERO => {
                let home_digits = minor_unit_digits(home).unwrap_or(FALLBACK_MINOR_DIGITS);
                let converted = invoice.total_amount.and_then(|t| t.checked_mul(rate)).map(|v| {
                    v.round_dp_with_strategy(home_digits, RoundingStrategy::MidpointAwayFromZero)
                });
                let message = match converted {
                    Some(total) => format!("amounts are in {currency}; total is {total} {home} at rate {rate}"),
                    None => format!("amounts are in {currency}; exchange rate {rate} to {home}"),
                };
                findings.push(Finding::new(
                    Severity::Info,
                    FindingCategory::Informational,
                    "currency_code",
                    message,
                ));
                converted
            }
            Some(rate) => {
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingCategory::DataIntegrity,
                    "exchange_rate",
                    format!("exchange rate {rate} must be positive"),
                ));
                None
            }
            None => {
                findings.push(Finding::new(
                    Severity::Info,
                    FindingCategory::Informational,
                    "currency_code",
                    format!("amounts are in {currency}; no exchange rate to {home} given"),
                ));
                None
            }
        }
    }
}

fn line_findings(index: usize, verdict: &VatVerdict, findings: &mut Vec<Finding>) {
    for issue in &verdict.integrity_issues {
        findings.push(Finding::for_line(
            index,
            Severity::Warning,
            FindingCategory::DataIntegrity,
            issue.field(),
            issue.to_string(),
        ));
    }

    if let Some(declared_rate) = verdict.declared_rate.filter(|_| !verdict.rate_matches()) {
        findings.push(Finding::for_line(
            index,
            Severity::Warning,
            FindingCategory::DataIntegrity,
            "vat_rate",
            format!(
                "declared rate {declared_rate}% differs from {}% ({})",
                verdict.rate, verdict.rule
            ),
        ));
    }

    match verdict.outcome {
        VatOutcome::Pass => {}
        VatOutcome::Fail => {
            let declared = verdict
                .declared_vat
                .map(|d| d.to_string())
                .unwrap_or_default();
            let off = verdict
                .discrepancy
                .map(|d| format!(" (off by {})", d.abs()))
                .unwrap_or_default();
            findings.push(Finding::for_line(
                index,
                Severity::Critical,
                FindingCategory::ComplianceViolation,
                "vat_amount",
                format!(
                    "declared VAT {declared} but {} implies {}{off}",
                    verdict.rule, verdict.expected_vat
                ),
            ));
        }
        VatOutcome::Unverifiable => {
            findings.push(Finding::for_line(
                index,
                Severity::Warning,
                FindingCategory::Uncertainty,
                "vat_amount",
                format!(
                    "no VAT amount declared; {} implies {}",
                    verdict.rule, verdict.expected_vat
                ),
            ));
        }
    }
}

fn reconciliation_findings(reconciliation: &VatReconciliation, findings: &mut Vec<Finding>) {
    match reconciliation.outcome {
        VatOutcome::Pass => {}
        VatOutcome::Fail => {
            let declared = reconciliation
                .declared_total
                .map(|d| d.to_string())
                .unwrap_or_default();
            findings.push(Finding::new(
                Severity::Critical,
                FindingCategory::ComplianceViolation,
                "total_vat",
                format!(
                    "declared total VAT {declared} does not match line VAT {} (tolerance {})",
                    reconciliation.expected_total, reconciliation.tolerance
                ),
            ));
        }
        VatOutcome::Unverifiable => {
            findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::Uncertainty,
                "total_vat",
                format!(
                    "no total VAT declared; lines imply {}",
                    reconciliation.expected_total
                ),
            ));
        }
    }
}
