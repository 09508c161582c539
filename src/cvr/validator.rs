//! Vendor CVR validation against the registry, backed by the cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::CvrCache;
use super::format::{Cvr, CvrFormatError, clean_cvr, validate_cvr_format};
use super::record::{CvrRecord, VendorStatus};
use super::registry::{RegistryClient, RegistryEntry, RegistryError};
use crate::core::{AuditConfig, Finding, FindingCategory, Severity};

const FIELD: &str = "vendor_cvr";

/// Where a verdict's status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// The number failed format validation; nothing was looked up.
    Format,
    /// A fresh cached record.
    Cache,
    /// A registry lookup made for this verdict.
    Registry,
    /// A stale cached record, used because the registry failed.
    StaleCache,
    /// Neither the registry nor the cache could answer.
    Unavailable,
}

/// Outcome of validating a vendor CVR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvrVerdict {
    /// The number as checked (cleaned of spaces and "DK" prefix).
    pub cvr: String,
    pub record: Option<CvrRecord>,
    pub status: VendorStatus,
    /// True only if the status is `Active`.
    pub compliant: bool,
    /// The record is past the freshness threshold and could not be refreshed.
    pub stale: bool,
    pub source: VerdictSource,
    /// Format or registry error behind a degraded verdict.
    pub detail: Option<String>,
}

impl CvrVerdict {
    fn malformed(err: CvrFormatError) -> Self {
        Self {
            cvr: clean_cvr(&err.value),
            record: None,
            status: VendorStatus::Unknown,
            compliant: false,
            stale: false,
            source: VerdictSource::Format,
            detail: Some(err.reason),
        }
    }

    fn from_record(record: CvrRecord, source: VerdictSource, detail: Option<String>) -> Self {
        let status = VendorStatus::from(record.status);
        Self {
            cvr: record.cvr.to_string(),
            compliant: status.is_compliant(),
            stale: source == VerdictSource::StaleCache,
            status,
            record: Some(record),
            source,
            detail,
        }
    }

    fn unreachable(cvr: String, detail: String) -> Self {
        Self {
            cvr,
            record: None,
            status: VendorStatus::Unreachable,
            compliant: false,
            stale: false,
            source: VerdictSource::Unavailable,
            detail: Some(detail),
        }
    }

    /// Findings implied by this verdict, all on the `vendor_cvr` field.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        let name = self
            .record
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .map(|n| format!(" ({n})"))
            .unwrap_or_default();

        let status_finding = match self.status {
            VendorStatus::Active => None,
            VendorStatus::Bankrupt => Some((
                Severity::Critical,
                FindingCategory::ComplianceViolation,
                format!("vendor {}{name} is bankrupt", self.cvr),
            )),
            VendorStatus::Dissolved => Some((
                Severity::Critical,
                FindingCategory::ComplianceViolation,
                format!("vendor {}{name} is dissolved", self.cvr),
            )),
            VendorStatus::UnderLiquidation => Some((
                Severity::Warning,
                FindingCategory::ComplianceViolation,
                format!("vendor {}{name} is under liquidation", self.cvr),
            )),
            VendorStatus::NotFound => Some((
                Severity::Warning,
                FindingCategory::ComplianceViolation,
                format!("CVR {} is not registered", self.cvr),
            )),
            VendorStatus::Unknown => Some((
                Severity::Warning,
                FindingCategory::Uncertainty,
                match (&self.source, &self.detail) {
                    (VerdictSource::Format, Some(reason)) => {
                        format!("CVR '{}' is malformed: {reason}", self.cvr)
                    }
                    _ => format!("registry status of CVR {} could not be determined", self.cvr),
                },
            )),
            VendorStatus::Unreachable => Some((
                Severity::Warning,
                FindingCategory::Uncertainty,
                format!(
                    "CVR registry unreachable and no cached record for {}{}",
                    self.cvr,
                    self.detail
                        .as_deref()
                        .map(|d| format!(": {d}"))
                        .unwrap_or_default()
                ),
            )),
        };
        if let Some((severity, category, message)) = status_finding {
            findings.push(Finding::new(severity, category, FIELD, message));
        }

        if self.stale {
            let fetched = self
                .record
                .as_ref()
                .map(|r| r.fetched_at.to_rfc3339())
                .unwrap_or_default();
            findings.push(Finding::new(
                Severity::Warning,
                FindingCategory::Uncertainty,
                FIELD,
                format!("using stale registry record for {} fetched {fetched}", self.cvr),
            ));
        }

        findings
    }
}

/// Validates vendor CVR numbers: format check, then cache, then registry.
///
/// Each registry attempt is bounded by the configured timeout, and a
/// transient failure is retried once after a short backoff. When the
/// registry fails, a stale cached record is used if one exists.
#[derive(Debug)]
pub struct CvrValidator<R> {
    registry: R,
    cache: Arc<CvrCache>,
    config: AuditConfig,
}

impl<R: RegistryClient> CvrValidator<R> {
    pub fn new(registry: R, cache: Arc<CvrCache>, config: AuditConfig) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<CvrCache> {
        &self.cache
    }

    pub async fn validate(&self, raw: &str) -> CvrVerdict {
        self.validate_at(raw, Utc::now()).await
    }

    /// Validate as of `now`, which decides cache freshness and stamps new records.
    pub async fn validate_at(&self, raw: &str, now: DateTime<Utc>) -> CvrVerdict {
        let cvr = match validate_cvr_format(raw) {
            Ok(cvr) => cvr,
            Err(err) => {
                tracing::debug!(input = raw, reason = %err.reason, "malformed CVR, skipping lookup");
                return CvrVerdict::malformed(err);
            }
        };

        let cached = self.cache.get(&cvr);
        if let Some(record) = cached.as_deref() {
            if self.cache.is_fresh(record, now) {
                tracing::debug!(cvr = %cvr, status = %record.status, "CVR cache hit");
                return CvrVerdict::from_record(record.clone(), VerdictSource::Cache, None);
            }
        }

        match self.lookup(&cvr).await {
            Ok(entry) => {
                let record = CvrRecord::new(cvr, entry.name, entry.status, now);
                self.cache.put(record.clone());
                tracing::info!(cvr = %record.cvr, status = %record.status, "CVR registry lookup");
                CvrVerdict::from_record(record, VerdictSource::Registry, None)
            }
            Err(err) => {
                tracing::warn!(cvr = %cvr, error = %err, "CVR registry lookup failed");
                self.degrade(cvr.to_string(), cached.as_deref(), err.to_string())
            }
        }
    }

    /// Best verdict available without calling the registry.
    ///
    /// Used when an in-flight lookup is abandoned: a fresh or stale cached
    /// record if one exists, `Unreachable` otherwise.
    pub fn fallback_at(&self, raw: &str, now: DateTime<Utc>, reason: &str) -> CvrVerdict {
        let cvr = match validate_cvr_format(raw) {
            Ok(cvr) => cvr,
            Err(err) => return CvrVerdict::malformed(err),
        };
        let cached = self.cache.get(&cvr);
        match cached.as_deref() {
            Some(record) if self.cache.is_fresh(record, now) => {
                CvrVerdict::from_record(record.clone(), VerdictSource::Cache, None)
            }
            record => self.degrade(cvr.to_string(), record, reason.to_string()),
        }
    }

    fn degrade(&self, cvr: String, stale: Option<&CvrRecord>, detail: String) -> CvrVerdict {
        match stale {
            Some(record) => {
                tracing::info!(cvr = %cvr, fetched_at = %record.fetched_at, "falling back to stale CVR record");
                CvrVerdict::from_record(record.clone(), VerdictSource::StaleCache, Some(detail))
            }
            None => CvrVerdict::unreachable(cvr, detail),
        }
    }

    async fn lookup(&self, cvr: &Cvr) -> Result<RegistryEntry, RegistryError> {
        let attempts = 1 + u32::from(self.config.retries());
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = tokio::time::timeout(
                self.config.request_timeout(),
                self.registry.fetch_registry_status(cvr),
            )
            .await
            .unwrap_or(Err(RegistryError::Timeout));

            match result {
                Err(err) if err.is_transient() && attempt < attempts => {
                    tracing::warn!(cvr = %cvr, attempt, error = %err, "transient registry error, retrying");
                    tokio::time::sleep(self.config.retry_backoff()).await;
                }
                other => return other,
            }
        }
    }
}
