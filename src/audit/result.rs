use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classify::AuditStatus;
use super::reconcile::VatReconciliation;
use crate::core::{Finding, Severity};
use crate::cvr::CvrVerdict;
use crate::vat::VatVerdict;

/// VAT verdict for one input line, keyed by its position in the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineVerdict {
    pub index: usize,
    pub description: String,
    pub verdict: VatVerdict,
}

/// Outcome of auditing one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub status: AuditStatus,
    /// Currency the amounts are in, as given on the invoice.
    pub currency: String,
    /// One verdict per input line, in input order.
    pub lines: Vec<LineVerdict>,
    /// Vendor check; `None` when the invoice carried no CVR number.
    pub cvr: Option<CvrVerdict>,
    pub reconciliation: VatReconciliation,
    pub findings: Vec<Finding>,
    /// Invoice total converted to the home currency, when known.
    pub total_amount_home: Option<Decimal>,
}

impl AuditResult {
    pub fn is_green(&self) -> bool {
        self.status == AuditStatus::Green
    }

    pub fn critical_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Critical)
    }

    /// Findings attached to line `index`.
    pub fn line_findings(&self, index: usize) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.line == Some(index))
    }

    /// Findings on a document-level field such as "total_vat".
    pub fn findings_for(&self, field: &str) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.field == field)
    }
}
