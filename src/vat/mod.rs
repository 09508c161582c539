//! VAT rule lookup and split-VAT verification.
//!
//! Maps free-text line descriptions to a Danish VAT treatment (standard
//! 25%, or zero-rated/exempt such as pant and newspapers) and checks each
//! line's declared VAT against it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use revisor::core::*;
//! use revisor::vat::*;
//! use rust_decimal_macros::dec;
//!
//! let rules = Arc::new(VatRuleStore::danish().unwrap());
//! let resolver = VatResolver::new(rules, 1);
//!
//! let pant = LineItemBuilder::new("Pant A", dec!(1), dec!(2.00))
//!     .vat(dec!(0), dec!(0.00))
//!     .build();
//! let verdict = resolver.resolve(&pant, PriceBasis::TaxInclusive);
//! assert_eq!(verdict.outcome, VatOutcome::Pass);
//! assert_eq!(verdict.exemption, Some(ExemptionReason::DepositReturn));
//! ```

mod normalize;
mod resolver;
mod rules;

pub use normalize::normalize_description;
pub use resolver::{IntegrityIssue, VatOutcome, VatResolver, VatVerdict, expected_vat};
pub use rules::{DANISH_STANDARD_RATE, ExemptionReason, MatchKind, VatRule, VatRuleStore};
