//! CVR number cleaning and format validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Modulus-11 weights for the eight CVR digits.
const WEIGHTS: [u32; 8] = [2, 7, 6, 5, 4, 3, 2, 1];

/// A format-valid Danish CVR number (8 digits, modulus-11 checksum).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cvr(String);

impl Cvr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cvr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cvr {
    type Err = CvrFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_cvr_format(s)
    }
}

impl TryFrom<String> for Cvr {
    type Error = CvrFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_cvr_format(&value)
    }
}

impl From<Cvr> for String {
    fn from(cvr: Cvr) -> Self {
        cvr.0
    }
}

/// Error returned when a CVR number fails format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvrFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for CvrFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CVR number '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for CvrFormatError {}

/// Strip whitespace, common separators and a leading "DK" country prefix.
///
/// "DK 12 34 56 78" and "12-34-56-78" both become "12345678".
pub fn clean_cvr(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.'))
        .collect();
    match compact.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("DK") => compact[2..].to_string(),
        _ => compact,
    }
}

/// Validate a CVR number by format (no network call).
///
/// The number is cleaned with [`clean_cvr`] first, then must be exactly
/// eight digits, must not start with zero and must pass the modulus-11
/// check with weights 2, 7, 6, 5, 4, 3, 2, 1.
pub fn validate_cvr_format(raw: &str) -> Result<Cvr, CvrFormatError> {
    let cleaned = clean_cvr(raw);
    let fail = |reason: String| CvrFormatError {
        value: raw.trim().to_string(),
        reason,
    };

    if cleaned.is_empty() {
        return Err(fail("empty".into()));
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(fail("must contain only digits".into()));
    }
    if cleaned.len() != 8 {
        return Err(fail(format!("expected 8 digits, got {}", cleaned.len())));
    }
    if cleaned.starts_with('0') {
        return Err(fail("must not start with 0".into()));
    }

    let sum: u32 = cleaned
        .bytes()
        .zip(WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    if sum % 11 != 0 {
        return Err(fail("checksum mismatch (modulus 11)".into()));
    }

    Ok(Cvr(cleaned))
}
