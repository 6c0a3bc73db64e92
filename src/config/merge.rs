//! Per-call configuration overrides
//!
//! A call may override any subset of the instance configuration. Merging
//! produces a fresh `Config` for that call; the instance is never mutated.

use serde::{Deserialize, Serialize};

use super::Config;

/// Subset of `Config` fields; `None` falls back to the instance value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, rename = "baseID", skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camel_case: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, rename = "requestTimeout", skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_retry_if_rate_limited: Option<bool>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_id(mut self, base_id: impl Into<String>) -> Self {
        self.base_id = Some(base_id.into());
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = Some(camel_case);
        self
    }

    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn no_retry_if_rate_limited(mut self, no_retry: bool) -> Self {
        self.no_retry_if_rate_limited = Some(no_retry);
        self
    }
}

/// Override accepted by every façade operation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigOverride {
    /// Use the instance configuration as-is
    #[default]
    None,
    /// Shorthand for overriding only the table name
    Table(String),
    /// Override any subset of fields
    Partial(PartialConfig),
}

impl From<&str> for ConfigOverride {
    fn from(table_name: &str) -> Self {
        ConfigOverride::Table(table_name.to_string())
    }
}

impl From<String> for ConfigOverride {
    fn from(table_name: String) -> Self {
        ConfigOverride::Table(table_name)
    }
}

impl From<PartialConfig> for ConfigOverride {
    fn from(partial: PartialConfig) -> Self {
        ConfigOverride::Partial(partial)
    }
}

impl<T: Into<ConfigOverride>> From<Option<T>> for ConfigOverride {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Config {
    /// Merge an override over this config; override fields win
    pub fn merge(&self, overrides: &ConfigOverride) -> Config {
        match overrides {
            ConfigOverride::None => self.clone(),
            ConfigOverride::Table(table_name) => Config {
                table_name: table_name.clone(),
                ..self.clone()
            },
            ConfigOverride::Partial(p) => Config {
                api_key: p.api_key.clone().unwrap_or_else(|| self.api_key.clone()),
                base_id: p.base_id.clone().unwrap_or_else(|| self.base_id.clone()),
                table_name: p
                    .table_name
                    .clone()
                    .unwrap_or_else(|| self.table_name.clone()),
                camel_case: p.camel_case.unwrap_or(self.camel_case),
                endpoint_url: p
                    .endpoint_url
                    .clone()
                    .unwrap_or_else(|| self.endpoint_url.clone()),
                request_timeout_ms: p.request_timeout_ms.unwrap_or(self.request_timeout_ms),
                no_retry_if_rate_limited: p
                    .no_retry_if_rate_limited
                    .unwrap_or(self.no_retry_if_rate_limited),
            },
        }
    }
}
