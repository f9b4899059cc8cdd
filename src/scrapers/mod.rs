//! Patent portal version probe.
//!
//! The portal's search front-end sends a JSON request that carries the
//! application and data versions it was built against. The probe loads the
//! portal in a headless browser, watches outgoing requests, and reads those
//! two fields from the first matching request body.

#[cfg(feature = "browser")]
mod browser;

#[cfg(feature = "browser")]
pub use browser::probe_versions;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("scraper is not configured: set scraper.portal_url")]
    NotConfigured,
    #[error("invalid portal URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("no request matching '{pattern}' seen within {waited:?}")]
    Timeout { pattern: String, waited: Duration },
}

/// Configuration for the portal version probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Page to load. Scraping is refused while unset.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Substring identifying the request that carries the versions.
    #[serde(default = "default_request_pattern")]
    pub request_pattern: String,
    /// JSON keys of the two version fields in the request body.
    #[serde(default = "default_version_fields")]
    pub version_fields: [String; 2],
    /// How long to wait for the request after navigation starts.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    /// Chromium executable; auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<String>,
}

fn default_request_pattern() -> String {
    "/api/".to_string()
}
fn default_version_fields() -> [String; 2] {
    ["appVersion".to_string(), "dataVersion".to_string()]
}
fn default_wait_secs() -> u64 {
    30
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            portal_url: None,
            request_pattern: default_request_pattern(),
            version_fields: default_version_fields(),
            wait_secs: default_wait_secs(),
            chrome_path: None,
        }
    }
}

impl ScraperConfig {
    /// The validated portal URL.
    pub fn portal_url(&self) -> Result<url::Url, ScrapeError> {
        let raw = self
            .portal_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ScrapeError::NotConfigured)?;
        Ok(url::Url::parse(raw.trim())?)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Whether an outgoing request URL is the one carrying the versions.
    pub fn matches_request(&self, request_url: &str) -> bool {
        !self.request_pattern.is_empty() && request_url.contains(&self.request_pattern)
    }

    /// Pull both version fields out of a JSON request body.
    ///
    /// Returns `None` unless the body is a JSON object holding both fields as
    /// strings or numbers.
    pub fn extract_versions(&self, body: &str) -> Option<PortalVersions> {
        let json: Value = serde_json::from_str(body).ok()?;
        let [first, second] = &self.version_fields;
        Some(PortalVersions {
            first: field_text(&json, first)?,
            second: field_text(&json, second)?,
        })
    }
}

fn field_text(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Version identifiers read from the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalVersions {
    pub first: String,
    pub second: String,
}
