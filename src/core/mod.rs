//! Core audit types, findings, configuration and errors.
//!
//! This module provides the extracted-invoice model consumed by the
//! auditor and the finding/severity vocabulary shared by every check.

mod builder;
mod config;
pub mod currencies;
mod error;
mod findings;
mod types;

pub use builder::*;
pub use config::*;
pub use currencies::{is_known_currency_code, minor_unit, minor_unit_digits};
pub use error::*;
pub use findings::*;
pub use types::*;
