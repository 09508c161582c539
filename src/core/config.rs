//! Audit policy configuration.
//!
//! Every tolerance and timeout the engine uses lives here, with defaults
//! that match Danish retail receipts. Values can come from JSON or from
//! `REVISOR_*` environment variables.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currencies::is_known_currency_code;
use super::error::AuditorError;

/// Public cvrapi.dk endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://cvrapi.dk/api";

/// When a cached registry record may be used without a new lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Freshness {
    /// Fresh if fetched on the same calendar day (UTC).
    SameDay,
    /// Fresh if fetched less than `hours` ago.
    MaxAge { hours: u32 },
}

impl Freshness {
    /// Whether a record fetched at `fetched_at` is still fresh at `now`.
    pub fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::SameDay => fetched_at.date_naive() == now.date_naive(),
            Self::MaxAge { hours } => {
                now.signed_duration_since(fetched_at)
                    < chrono::Duration::hours(i64::from(*hours))
            }
        }
    }
}

/// Configuration for the VAT resolver, CVR validator and audit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Currency the bookkeeping is done in.
    pub home_currency: String,
    /// Per-line tolerance, in minor currency units.
    pub line_tolerance_minor_units: u32,
    /// Cache freshness policy for CVR records.
    pub freshness: Freshness,
    /// Base URL of the CVR registry API.
    pub registry_url: String,
    /// User-Agent sent to the registry (cvrapi.dk rejects anonymous clients).
    pub user_agent: String,
    /// Timeout per registry request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Pause before the single retry, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Retries after a transient registry failure (at most 1).
    pub max_retries: u8,
    /// Maximum number of CVR records held in memory.
    pub cache_capacity: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            home_currency: "DKK".to_string(),
            line_tolerance_minor_units: 1,
            freshness: Freshness::SameDay,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            user_agent: concat!("revisor/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_ms: 5_000,
            retry_backoff_ms: 250,
            max_retries: 1,
            cache_capacity: 10_000,
        }
    }
}

impl AuditConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Effective retry count; never more than one.
    pub fn retries(&self) -> u8 {
        self.max_retries.min(1)
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), AuditorError> {
        if !is_known_currency_code(&self.home_currency) {
            return Err(AuditorError::Config(format!(
                "home currency '{}' is not a known ISO 4217 code",
                self.home_currency
            )));
        }
        if !self.registry_url.starts_with("http://") && !self.registry_url.starts_with("https://")
        {
            return Err(AuditorError::Config(format!(
                "registry URL '{}' must start with http:// or https://",
                self.registry_url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(AuditorError::Config(
                "request timeout must be greater than zero".into(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(AuditorError::Config(
                "cache capacity must be greater than zero".into(),
            ));
        }
        if let Freshness::MaxAge { hours: 0 } = self.freshness {
            return Err(AuditorError::Config(
                "freshness window must be at least one hour".into(),
            ));
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, AuditorError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AuditorError::Config(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditorError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Read configuration from the environment, after loading a `.env`
    /// file if one is present.
    pub fn from_env() -> Result<Self, AuditorError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, using the same
    /// `REVISOR_*` names as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuditorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let freshness = match parse_var::<u32>(&var, "REVISOR_CVR_MAX_AGE_HOURS")? {
            Some(hours) => Freshness::MaxAge { hours },
            None => defaults.freshness,
        };

        let config = Self {
            home_currency: var("REVISOR_HOME_CURRENCY")
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or(defaults.home_currency),
            line_tolerance_minor_units: parse_var(&var, "REVISOR_LINE_TOLERANCE_MINOR_UNITS")?
                .unwrap_or(defaults.line_tolerance_minor_units),
            freshness,
            registry_url: var("REVISOR_REGISTRY_URL").unwrap_or(defaults.registry_url),
            user_agent: var("REVISOR_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_ms: parse_var(&var, "REVISOR_REQUEST_TIMEOUT_MS")?
                .unwrap_or(defaults.request_timeout_ms),
            retry_backoff_ms: parse_var(&var, "REVISOR_RETRY_BACKOFF_MS")?
                .unwrap_or(defaults.retry_backoff_ms),
            max_retries: parse_var(&var, "REVISOR_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            cache_capacity: parse_var(&var, "REVISOR_CACHE_CAPACITY")?
                .unwrap_or(defaults.cache_capacity),
        };

        config.validate()?;
        tracing::debug!(
            home_currency = %config.home_currency,
            registry_url = %config.registry_url,
            "audit configuration loaded"
        );
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AuditorError> {
    match var(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AuditorError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}
