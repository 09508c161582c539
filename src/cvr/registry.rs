//! The CVR registry as seen by the validator.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::format::Cvr;
use super::record::RegistryStatus;

/// What the registry reports for one CVR number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub status: RegistryStatus,
    pub name: Option<String>,
}

impl RegistryEntry {
    pub fn new(status: RegistryStatus, name: Option<String>) -> Self {
        Self { status, name }
    }
}

/// Error from a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// The request did not complete in time.
    Timeout,
    /// Connection failed or was interrupted.
    Network(String),
    /// Unexpected HTTP status.
    Http { status: u16, body: String },
    /// The registry answered with an error message.
    Api(String),
    /// The response could not be understood.
    Parse(String),
}

impl RegistryError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Api(_) | Self::Parse(_) => false,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("CVR registry request timed out"),
            Self::Network(e) => write!(f, "CVR registry network error: {e}"),
            Self::Http { status, body } => write!(f, "CVR registry HTTP {status}: {body}"),
            Self::Api(e) => write!(f, "CVR registry API error: {e}"),
            Self::Parse(e) => write!(f, "CVR registry parse error: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// A source of registry statuses, such as cvrapi.dk.
///
/// The validator bounds every call with its own timeout; implementations
/// need not.
pub trait RegistryClient: Send + Sync {
    fn fetch_registry_status(
        &self,
        cvr: &Cvr,
    ) -> impl Future<Output = Result<RegistryEntry, RegistryError>> + Send;
}

impl<T: RegistryClient> RegistryClient for Arc<T> {
    fn fetch_registry_status(
        &self,
        cvr: &Cvr,
    ) -> impl Future<Output = Result<RegistryEntry, RegistryError>> + Send {
        (**self).fetch_registry_status(cvr)
    }
}
