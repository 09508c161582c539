//! VAT rule store: ordered description patterns mapped to VAT treatment.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::normalize::normalize_description;
use crate::core::AuditorError;

/// Danish standard VAT rate (momsloven §33).
pub const DANISH_STANDARD_RATE: Decimal = dec!(25);

const BUILTIN_RULES: &str = include_str!("../../data/vat_rules.json");

/// Why an item is zero-rated or exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExemptionReason {
    /// Deposit on bottles and cans (pant).
    DepositReturn,
    /// Newspapers.
    Press,
    /// Postage stamps and postal services.
    Postage,
    /// Insurance, banking and other financial services.
    Financial,
    /// Medical and dental treatment.
    Healthcare,
    /// Teaching and tuition.
    Education,
    /// Public passenger transport.
    PassengerTransport,
    /// Anything else, typically a user-defined rule.
    Other,
}

impl ExemptionReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DepositReturn => "deposit-return",
            Self::Press => "press",
            Self::Postage => "postage",
            Self::Financial => "financial",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::PassengerTransport => "passenger-transport",
            Self::Other => "other",
        }
    }
}

/// How a rule pattern is matched against a normalized description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Pattern may appear anywhere, including inside a word.
    #[default]
    Substring,
    /// Pattern must appear as whole words.
    Keyword,
    /// Pattern must end a word, as in Danish compounds ("dåsepant",
    /// "søndagsavis"), but may not start one ("pantalon").
    Suffix,
}

/// A single description pattern and the VAT treatment it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRule {
    /// Match pattern; normalized the same way as descriptions.
    pub pattern: String,
    #[serde(default, rename = "match")]
    pub match_kind: MatchKind,
    /// VAT rate in percent (0–100).
    pub rate: Decimal,
    /// Exemption reason for zero-rated or exempt treatment.
    #[serde(default)]
    pub reason: Option<ExemptionReason>,
    /// Human-readable label used in findings.
    #[serde(default)]
    pub label: Option<String>,
}

impl VatRule {
    /// A substring rule with no exemption reason.
    pub fn new(pattern: impl Into<String>, rate: Decimal) -> Self {
        Self {
            pattern: pattern.into(),
            match_kind: MatchKind::Substring,
            rate,
            reason: None,
            label: None,
        }
    }

    /// Require the pattern to match whole words.
    pub fn keyword(mut self) -> Self {
        self.match_kind = MatchKind::Keyword;
        self
    }

    /// Require the pattern to end a word; compounds ending in it match.
    pub fn suffix(mut self) -> Self {
        self.match_kind = MatchKind::Suffix;
        self
    }

    pub fn reason(mut self, reason: ExemptionReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this is the store's fallback standard-rate rule.
    pub fn is_default(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Label for findings: explicit label, else the pattern.
    pub fn display_name(&self) -> &str {
        match (&self.label, self.is_default()) {
            (Some(label), _) => label.as_str(),
            (None, true) => "standard rate",
            (None, false) => self.pattern.as_str(),
        }
    }
}

/// On-disk layout of a rule file.
#[derive(Debug, Serialize, Deserialize)]
struct RuleFile {
    standard_rate: Decimal,
    #[serde(default)]
    rules: Vec<VatRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    needle: String,
    rule: VatRule,
}

impl CompiledRule {
    fn matches(&self, normalized: &str) -> bool {
        let words: Vec<&str> = normalized.split(' ').collect();
        let needle: Vec<&str> = self.needle.split(' ').collect();
        match self.rule.match_kind {
            MatchKind::Substring => normalized.contains(&self.needle),
            MatchKind::Keyword => words.windows(needle.len()).any(|w| w == needle.as_slice()),
            // Only the first needle word may be the tail of a longer word.
            MatchKind::Suffix => words
                .windows(needle.len())
                .any(|w| w[0].ends_with(needle[0]) && w[1..] == needle[1..]),
        }
    }
}

/// Immutable, ordered VAT rule set.
///
/// Rules are tried longest normalized pattern first; rules of equal length
/// keep their load order. The first match wins, and descriptions matching
/// no rule get the standard rate. Share between threads with `Arc`.
#[derive(Debug, Clone)]
pub struct VatRuleStore {
    rules: Vec<CompiledRule>,
    default_rule: VatRule,
}

impl VatRuleStore {
    /// Build a store from a standard rate and rules in load order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditorError::RuleData`] for rates outside 0–100, patterns
    /// that normalize to nothing, or duplicate patterns.
    pub fn new(standard_rate: Decimal, rules: Vec<VatRule>) -> Result<Self, AuditorError> {
        check_rate(standard_rate, "standard rate")?;

        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for (i, rule) in rules.into_iter().enumerate() {
            check_rate(rule.rate, &format!("rules[{i}] ('{}')", rule.pattern))?;
            let needle = normalize_description(&rule.pattern);
            if needle.is_empty() {
                return Err(AuditorError::RuleData(format!(
                    "rules[{i}]: pattern '{}' is empty after normalization",
                    rule.pattern
                )));
            }
            if !seen.insert((needle.clone(), rule.match_kind)) {
                return Err(AuditorError::RuleData(format!(
                    "rules[{i}]: duplicate pattern '{}'",
                    rule.pattern
                )));
            }
            compiled.push(CompiledRule { needle, rule });
        }

        // Stable: equal lengths keep load order.
        compiled.sort_by_key(|c| Reverse(c.needle.chars().count()));

        Ok(Self {
            rules: compiled,
            default_rule: VatRule {
                pattern: String::new(),
                match_kind: MatchKind::Substring,
                rate: standard_rate,
                reason: None,
                label: Some(format!("Standard rate ({standard_rate}%)")),
            },
        })
    }

    /// The built-in Danish rule set.
    pub fn danish() -> Result<Self, AuditorError> {
        Self::from_json_str(BUILTIN_RULES)
    }

    /// Parse a JSON rule file.
    pub fn from_json_str(json: &str) -> Result<Self, AuditorError> {
        let file: RuleFile = serde_json::from_str(json)
            .map_err(|e| AuditorError::RuleData(format!("invalid rule file: {e}")))?;
        Self::new(file.standard_rate, file.rules)
    }

    /// Load a JSON rule file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditorError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&raw)?;
        tracing::info!(
            rules = store.len(),
            path = %path.display(),
            "loaded VAT rules"
        );
        Ok(store)
    }

    /// Find the rule for a description. Never fails: unmatched
    /// descriptions get the standard-rate rule.
    pub fn lookup(&self, description: &str) -> &VatRule {
        let normalized = normalize_description(description);
        self.rules
            .iter()
            .find(|c| c.matches(&normalized))
            .map(|c| &c.rule)
            .unwrap_or(&self.default_rule)
    }

    pub fn standard_rate(&self) -> Decimal {
        self.default_rule.rate
    }

    /// Rules in evaluation order (excluding the default rule).
    pub fn rules(&self) -> impl Iterator<Item = &VatRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Return a new store that also contains `rule`, e.g. one learned from
    /// reviewer feedback. The current store is left untouched.
    ///
    /// # Errors
    ///
    /// Fails like [`new`](Self::new), including when the pattern already exists.
    pub fn with_rule(&self, rule: VatRule) -> Result<Self, AuditorError> {
        let mut rules: Vec<VatRule> = self.rules().cloned().collect();
        rules.push(rule);
        Self::new(self.standard_rate(), rules)
    }

    /// Serialize the store in the rule-file layout.
    pub fn to_json(&self) -> Result<String, AuditorError> {
        let file = RuleFile {
            standard_rate: self.standard_rate(),
            rules: self.rules().cloned().collect(),
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| AuditorError::RuleData(format!("cannot serialize rules: {e}")))
    }

    /// Write the store to disk in the rule-file layout.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AuditorError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn check_rate(rate: Decimal, what: &str) -> Result<(), AuditorError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(AuditorError::RuleData(format!(
            "{what}: rate {rate} is outside 0-100%"
        )));
    }
    Ok(())
}
