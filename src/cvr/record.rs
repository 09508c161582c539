//! Registry records and statuses.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::Cvr;

/// Status of a company as reported by the CVR registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryStatus {
    /// Normal, trading company.
    Active,
    /// Under bankruptcy (konkurs).
    Bankrupt,
    /// Ceased (ophørt).
    Dissolved,
    /// Under compulsory or voluntary liquidation.
    UnderLiquidation,
    /// No company is registered under the number.
    NotFound,
    /// The registry answered, but the status could not be determined.
    Unknown,
}

impl RegistryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Bankrupt => "bankrupt",
            Self::Dissolved => "dissolved",
            Self::UnderLiquidation => "under_liquidation",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a vendor as seen by the validator.
///
/// Adds `Unreachable` to the registry statuses: the registry could not be
/// asked and no cached record existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Active,
    Bankrupt,
    Dissolved,
    UnderLiquidation,
    NotFound,
    /// Malformed number, or an undeterminable registry status.
    Unknown,
    Unreachable,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match RegistryStatus::try_from(*self) {
            Ok(status) => status.as_str(),
            Err(_) => "unreachable",
        }
    }

    /// Only an active company is compliant.
    pub fn is_compliant(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Bankrupt or dissolved companies cannot issue valid invoices.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Bankrupt | Self::Dissolved)
    }
}

impl From<RegistryStatus> for VendorStatus {
    fn from(status: RegistryStatus) -> Self {
        match status {
            RegistryStatus::Active => Self::Active,
            RegistryStatus::Bankrupt => Self::Bankrupt,
            RegistryStatus::Dissolved => Self::Dissolved,
            RegistryStatus::UnderLiquidation => Self::UnderLiquidation,
            RegistryStatus::NotFound => Self::NotFound,
            RegistryStatus::Unknown => Self::Unknown,
        }
    }
}

impl TryFrom<VendorStatus> for RegistryStatus {
    type Error = VendorStatus;

    fn try_from(status: VendorStatus) -> Result<Self, Self::Error> {
        Ok(match status {
            VendorStatus::Active => Self::Active,
            VendorStatus::Bankrupt => Self::Bankrupt,
            VendorStatus::Dissolved => Self::Dissolved,
            VendorStatus::UnderLiquidation => Self::UnderLiquidation,
            VendorStatus::NotFound => Self::NotFound,
            VendorStatus::Unknown => Self::Unknown,
            VendorStatus::Unreachable => return Err(status),
        })
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known registry state of one CVR number.
///
/// Records are replaced whole, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvrRecord {
    pub cvr: Cvr,
    /// Registered company name, if the registry returned one.
    #[serde(default)]
    pub name: Option<String>,
    pub status: RegistryStatus,
    /// When the registry was queried.
    pub fetched_at: DateTime<Utc>,
}

impl CvrRecord {
    pub fn new(
        cvr: Cvr,
        name: Option<String>,
        status: RegistryStatus,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cvr,
            name,
            status,
            fetched_at,
        }
    }
}
