//! Danish CVR number validation and registry lookups.
//!
//! - [`validate_cvr_format`] checks a number offline (modulus 11).
//! - [`CvrCache`] keeps the last known registry status per number.
//! - [`CvrValidator`] combines both with a [`RegistryClient`] and degrades
//!   to stale cached data when the registry is unavailable.
//!
//! ```
//! use revisor::cvr::validate_cvr_format;
//!
//! assert_eq!(validate_cvr_format("DK 35 95 47 16").unwrap().as_str(), "35954716");
//! assert!(validate_cvr_format("35954717").is_err());
//! ```

mod cache;
mod format;
#[cfg(feature = "http")]
mod http;
mod record;
mod registry;
mod validator;

pub use cache::CvrCache;
pub use format::{Cvr, CvrFormatError, clean_cvr, validate_cvr_format};
#[cfg(feature = "http")]
pub use http::{CvrApiClient, derive_status, entry_from_response};
pub use record::{CvrRecord, RegistryStatus, VendorStatus};
pub use registry::{RegistryClient, RegistryEntry, RegistryError};
pub use validator::{CvrValidator, CvrVerdict, VerdictSource};
