//! cvrapi.dk registry client.

use serde_json::Value;

use super::format::Cvr;
use super::record::RegistryStatus;
use super::registry::{RegistryClient, RegistryEntry, RegistryError};
use crate::core::{AuditConfig, AuditorError};

/// Response fields that may carry a textual company status.
const STATUS_FIELDS: [&str; 3] = ["status", "companydesc", "creditstatus"];

/// Error bodies are cut to this many characters before they reach findings.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Registry client for the public cvrapi.dk API.
///
/// Queries `GET {registry_url}?search={cvr}&country=dk` with the
/// configured User-Agent and timeout.
#[derive(Debug, Clone)]
pub struct CvrApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CvrApiClient {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditorError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AuditorError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.registry_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, cvr: &Cvr) -> Result<RegistryEntry, RegistryError> {
        tracing::debug!(cvr = %cvr, url = %self.base_url, "querying CVR registry");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("search", cvr.as_str()), ("country", "dk")])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(RegistryEntry::new(RegistryStatus::NotFound, None));
        }

        let body = resp.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| RegistryError::Parse(e.to_string()))?;
        entry_from_response(&value)
    }
}

impl RegistryClient for CvrApiClient {
    async fn fetch_registry_status(&self, cvr: &Cvr) -> Result<RegistryEntry, RegistryError> {
        self.fetch(cvr).await
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> RegistryError {
    if e.is_timeout() {
        RegistryError::Timeout
    } else {
        RegistryError::Network(e.to_string())
    }
}

/// Turn a cvrapi.dk JSON body into a registry entry.
///
/// An `error` field of `NOT_FOUND` is a regular "not found" answer; any
/// other error value is an API error.
pub fn entry_from_response(value: &Value) -> Result<RegistryEntry, RegistryError> {
    let Some(obj) = value.as_object() else {
        return Err(RegistryError::Parse("expected a JSON object".into()));
    };

    if let Some(error) = obj.get("error").filter(|e| !e.is_null()) {
        let code = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        if code.eq_ignore_ascii_case("NOT_FOUND") {
            return Ok(RegistryEntry::new(RegistryStatus::NotFound, None));
        }
        return Err(RegistryError::Api(code));
    }

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(RegistryEntry::new(derive_status(value), name))
}

/// Derive a registry status from a cvrapi.dk company object.
///
/// - `enddate` set: dissolved
/// - `creditbankrupt` true, or a status text mentioning "konkurs": bankrupt
/// - status text mentioning "tvangsopløsning" or "likvidation": under liquidation
/// - no `vat` and no `name`: unknown
/// - otherwise active
pub fn derive_status(value: &Value) -> RegistryStatus {
    let has_text = |key: &str| value.get(key).and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty());

    if has_text("enddate") {
        return RegistryStatus::Dissolved;
    }

    let status_text: String = STATUS_FIELDS
        .iter()
        .filter_map(|key| value.get(*key))
        .filter(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let bankrupt_flag = value
        .get("creditbankrupt")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if bankrupt_flag || status_text.contains("konkurs") {
        return RegistryStatus::Bankrupt;
    }
    if status_text.contains("tvangsopløsning") || status_text.contains("likvidation") {
        return RegistryStatus::UnderLiquidation;
    }
    if value.get("vat").is_none_or(Value::is_null) && !has_text("name") {
        return RegistryStatus::Unknown;
    }
    RegistryStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_error_body_is_kept() {
        assert_eq!(truncate_body(" maintenance\n"), "maintenance");
    }

    #[test]
    fn long_error_body_is_truncated() {
        let page = format!("<html>{}</html>", "ø".repeat(500));
        let cut = truncate_body(&page);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(cut.starts_with("<html>"));
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn active_company() {
        let v = json!({"vat": 35954716, "name": "NETTO A/S", "enddate": null, "creditbankrupt": false});
        let entry = entry_from_response(&v).unwrap();
        assert_eq!(entry.status, RegistryStatus::Active);
        assert_eq!(entry.name.as_deref(), Some("NETTO A/S"));
    }

    #[test]
    fn enddate_means_dissolved() {
        let v = json!({"vat": 35954716, "name": "X ApS", "enddate": "01/02/2020"});
        assert_eq!(derive_status(&v), RegistryStatus::Dissolved);
    }

    #[test]
    fn bankrupt_flag_and_text() {
        let v = json!({"vat": 35954716, "name": "X ApS", "creditbankrupt": true});
        assert_eq!(derive_status(&v), RegistryStatus::Bankrupt);
        let v = json!({"vat": 35954716, "name": "X ApS", "status": "Under konkurs"});
        assert_eq!(derive_status(&v), RegistryStatus::Bankrupt);
    }

    #[test]
    fn liquidation_text() {
        let v = json!({"vat": 35954716, "name": "X ApS", "status": "Under tvangsopløsning"});
        assert_eq!(derive_status(&v), RegistryStatus::UnderLiquidation);
        let v = json!({"vat": 35954716, "name": "X ApS", "status": "Under frivillig likvidation"});
        assert_eq!(derive_status(&v), RegistryStatus::UnderLiquidation);
    }

    #[test]
    fn company_name_does_not_trigger_status() {
        let v = json!({"vat": 35954716, "name": "Konkursrytteren ApS"});
        assert_eq!(derive_status(&v), RegistryStatus::Active);
    }

    #[test]
    fn empty_object_is_unknown() {
        assert_eq!(derive_status(&json!({})), RegistryStatus::Unknown);
    }

    #[test]
    fn not_found_error() {
        let entry = entry_from_response(&json!({"error": "NOT_FOUND"})).unwrap();
        assert_eq!(entry.status, RegistryStatus::NotFound);
    }

    #[test]
    fn other_api_error() {
        let err = entry_from_response(&json!({"error": "QUOTA_EXCEEDED"})).unwrap_err();
        assert_eq!(err, RegistryError::Api("QUOTA_EXCEEDED".into()));
    }

    #[test]
    fn non_object_is_parse_error() {
        assert!(matches!(
            entry_from_response(&json!([1, 2])),
            Err(RegistryError::Parse(_))
        ));
    }
}
