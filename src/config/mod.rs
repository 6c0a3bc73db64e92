//! Connection Configuration
//!
//! Instance-level settings for one table-scoped connection: credentials,
//! base and table addressing, endpoint, timeout and response shaping.

mod merge;

pub use merge::{ConfigOverride, PartialConfig};

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AirtableError, AirtableResult};

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
/// Environment variable holding the base ID
pub const ENV_BASE_ID: &str = "AIRTABLE_BASE_ID";
/// Environment variable holding the table name
pub const ENV_TABLE_NAME: &str = "AIRTABLE_TABLE_NAME";
/// Environment variable overriding the endpoint URL
pub const ENV_ENDPOINT_URL: &str = "AIRTABLE_ENDPOINT_URL";

/// Connection configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Base identifier (`app...`)
    #[serde(default, rename = "baseID")]
    pub base_id: String,

    /// Table name or table identifier
    #[serde(default)]
    pub table_name: String,

    /// Convert returned field names to lowerCamelCase (default: false).
    /// Columns that collide after conversion keep only the first in key order.
    #[serde(default)]
    pub camel_case: bool,

    /// Service root (default: "https://api.airtable.com")
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Per-request timeout in milliseconds (default: 300000)
    #[serde(default = "default_request_timeout", rename = "requestTimeout")]
    pub request_timeout_ms: u64,

    /// Fail immediately on HTTP 429 instead of backing off (default: false)
    #[serde(default)]
    pub no_retry_if_rate_limited: bool,
}

fn default_endpoint_url() -> String {
    "https://api.airtable.com".to_string()
}

fn default_request_timeout() -> u64 {
    300_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table_name: String::new(),
            camel_case: false,
            endpoint_url: default_endpoint_url(),
            request_timeout_ms: default_request_timeout(),
            no_retry_if_rate_limited: false,
        }
    }
}

// The API key never reaches logs or panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .field("camel_case", &self.camel_case)
            .field("endpoint_url", &self.endpoint_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("no_retry_if_rate_limited", &self.no_retry_if_rate_limited)
            .finish()
    }
}

impl Config {
    /// Create a config addressing one table
    pub fn new(
        api_key: impl Into<String>,
        base_id: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Build a config from the `AIRTABLE_*` environment variables.
    ///
    /// Unset variables leave the field empty (or at its default).
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            api_key: var(ENV_API_KEY).unwrap_or_default(),
            base_id: var(ENV_BASE_ID).unwrap_or_default(),
            table_name: var(ENV_TABLE_NAME).unwrap_or_default(),
            endpoint_url: var(ENV_ENDPOINT_URL).unwrap_or(defaults.endpoint_url),
            ..defaults
        }
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AirtableResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_no_retry_if_rate_limited(mut self, no_retry: bool) -> Self {
        self.no_retry_if_rate_limited = no_retry;
        self
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Presence checks run before a request is issued
    pub fn validate(&self) -> AirtableResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AirtableError::config("apiKey is required"));
        }
        if self.base_id.trim().is_empty() {
            return Err(AirtableError::config("baseID is required"));
        }
        if self.table_name.trim().is_empty() {
            return Err(AirtableError::config("tableName is required"));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(AirtableError::config("endpointUrl is required"));
        }
        Ok(())
    }
}
