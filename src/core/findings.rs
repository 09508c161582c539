use serde::{Deserialize, Serialize};

/// How serious a finding is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only; never affects the audit status.
    Info,
    /// Needs a human look (status at least Review).
    Warning,
    /// Definitive violation (status Red).
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which class of problem a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Impossible or malformed input values (negative totals, zero quantity).
    DataIntegrity,
    /// A signal could not be determined (registry unreachable, VAT not stated).
    Uncertainty,
    /// A definitively bad signal (bankrupt vendor, VAT math off).
    ComplianceViolation,
    /// Context for the reviewer, such as currency conversion.
    Informational,
}

/// A single audit finding with the location of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: FindingCategory,
    /// Index of the offending line item, if the finding is line-scoped.
    pub line: Option<usize>,
    /// Path to the offending field (e.g. "lines[2].vat_amount", "vendor_cvr").
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// Create a document- or vendor-level finding.
    pub fn new(
        severity: Severity,
        category: FindingCategory,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            line: None,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a finding scoped to line `index`; `field` is the field name
    /// within the line (e.g. "quantity").
    pub fn for_line(
        index: usize,
        severity: Severity,
        category: FindingCategory,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            line: Some(index),
            field: format!("lines[{index}].{field}"),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}
