//! # revisor
//!
//! Deterministic audit engine for Danish invoices and receipts. Takes line
//! items produced by an upstream extraction step and decides whether the
//! document can be booked:
//!
//! - VAT per line, against a rule table of zero-rated and exempt items
//!   (pant, newspapers, postage, ...) with 25% as the default
//! - the vendor's CVR number, by checksum and against the CVR registry
//! - the declared VAT total against the sum of the lines
//!
//! The result is a Green / Review / Red status with itemized findings.
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use revisor::core::*;
//! use revisor::vat::*;
//! use rust_decimal_macros::dec;
//!
//! let resolver = VatResolver::new(Arc::new(VatRuleStore::danish().unwrap()), 1);
//!
//! let line = LineItemBuilder::new("Kontorstol", dec!(1), dec!(100.00))
//!     .vat(dec!(25), dec!(25.00))
//!     .build();
//! let verdict = resolver.resolve(&line, PriceBasis::TaxExclusive);
//! assert_eq!(verdict.expected_vat, dec!(25.00));
//! assert_eq!(verdict.outcome, VatOutcome::Pass);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Invoice types, findings, configuration, errors |
//! | `vat` | VAT rule store and per-line resolver |
//! | `cvr` | CVR format check, record cache, validator |
//! | `http` | cvrapi.dk registry client (reqwest) |
//! | `audit` (default) | Audit decision engine |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "vat")]
pub mod vat;

#[cfg(feature = "cvr")]
pub mod cvr;

#[cfg(feature = "audit")]
pub mod audit;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
