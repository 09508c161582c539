use serde::{Deserialize, Serialize};

use crate::core::{Finding, Severity};

/// Final approval tier of an audited invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuditStatus {
    /// Nothing to look at; safe to book.
    Green,
    /// Uncertain or incomplete; a human should check it.
    Review,
    /// Definitive problem: VAT math off or vendor not trading.
    Red,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Review => "Review",
            Self::Red => "Red",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the audit status from findings.
///
/// Any critical finding makes the invoice Red, otherwise any warning makes
/// it Review. Informational findings never change the status.
pub fn classify(findings: &[Finding]) -> AuditStatus {
    match findings.iter().map(|f| f.severity).max() {
        Some(Severity::Critical) => AuditStatus::Red,
        Some(Severity::Warning) => AuditStatus::Review,
        Some(Severity::Info) | None => AuditStatus::Green,
    }
}
