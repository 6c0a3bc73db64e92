//! HTTP client for the Airtable REST API

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::retry::RetryPolicy;
use super::TableClient;
use crate::config::Config;
use crate::errors::{AirtableError, AirtableResult};
use crate::observability::{Event, Logger};
use crate::params::ReadParams;
use crate::record::{DeletedRecord, Fields, Page, Record};

/// Path prefix of every table endpoint
pub const API_VERSION: &str = "v0";

/// reqwest-backed `TableClient`
#[derive(Debug, Clone)]
pub struct HttpTableClient {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTableClient {
    /// Create a client with its own connection pool
    pub fn new() -> AirtableResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("airtable-plus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// `{endpointUrl}/v0/{baseID}/{tableName}[/{id}]`, segments percent-encoded
    pub fn table_url(config: &Config, id: Option<&str>) -> AirtableResult<Url> {
        let mut url = Url::parse(&config.endpoint_url).map_err(|e| {
            AirtableError::config(format!("endpointUrl '{}': {}", config.endpoint_url, e))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AirtableError::config(format!(
                    "endpointUrl '{}' cannot carry a path",
                    config.endpoint_url
                ))
            })?;
            segments
                .pop_if_empty()
                .push(API_VERSION)
                .push(&config.base_id)
                .push(&config.table_name);
            if let Some(id) = id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    async fn send(
        &self,
        config: &Config,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> AirtableResult<Vec<u8>> {
        config.validate()?;

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&config.api_key)
                .timeout(config.request_timeout());
            if let Some(body) = &body {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let attempt = attempts.to_string();
            Logger::event(
                Event::RequestSent,
                &[
                    ("attempt", &attempt),
                    ("method", method.as_str()),
                    ("path", url.path()),
                ],
            );

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    Logger::event(
                        Event::RequestFailed,
                        &[("path", url.path()), ("reason", &e.to_string())],
                    );
                    return Err(e.into());
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                drop(response);
                let retries_used = attempts - 1;
                if config.no_retry_if_rate_limited || retries_used >= self.retry.max_retries {
                    Logger::event(
                        Event::RateLimitExhausted,
                        &[("attempts", &attempt), ("path", url.path())],
                    );
                    return Err(AirtableError::RateLimited { attempts });
                }

                let delay = self.retry.delay(retries_used);
                let delay_ms = delay.as_millis().to_string();
                Logger::event(
                    Event::RateLimitRetry,
                    &[
                        ("attempt", &attempt),
                        ("delay_ms", &delay_ms),
                        ("path", url.path()),
                    ],
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let bytes = response.bytes().await?;
            let code = status.as_u16().to_string();
            Logger::event(
                Event::ResponseReceived,
                &[("path", url.path()), ("status", &code)],
            );

            if !status.is_success() {
                let err = api_error(status, &bytes);
                Logger::event(
                    Event::RequestFailed,
                    &[("path", url.path()), ("reason", &err.to_string())],
                );
                return Err(err);
            }

            return Ok(bytes.to_vec());
        }
    }

    async fn write(
        &self,
        config: &Config,
        method: Method,
        id: Option<&str>,
        fields: &Fields,
    ) -> AirtableResult<Record> {
        let url = Self::table_url(config, id)?;
        let body = serde_json::to_vec(&json!({ "fields": fields }))?;
        let bytes = self.send(config, method, url, Some(body)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl TableClient for HttpTableClient {
    async fn list_page(
        &self,
        config: &Config,
        params: &ReadParams,
        offset: Option<&str>,
    ) -> AirtableResult<Page> {
        let mut url = Self::table_url(config, None)?;
        let pairs = params.to_query_pairs(offset);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let bytes = self.send(config, Method::GET, url, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get(&self, config: &Config, id: &str) -> AirtableResult<Record> {
        let url = Self::table_url(config, Some(id))?;
        let bytes = self.send(config, Method::GET, url, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn create(&self, config: &Config, fields: &Fields) -> AirtableResult<Record> {
        self.write(config, Method::POST, None, fields).await
    }

    async fn update(&self, config: &Config, id: &str, fields: &Fields) -> AirtableResult<Record> {
        self.write(config, Method::PATCH, Some(id), fields).await
    }

    async fn replace(
        &self,
        config: &Config,
        id: &str,
        fields: &Fields,
    ) -> AirtableResult<Record> {
        self.write(config, Method::PUT, Some(id), fields).await
    }

    async fn destroy(&self, config: &Config, id: &str) -> AirtableResult<DeletedRecord> {
        let url = Self::table_url(config, Some(id))?;
        let bytes = self.send(config, Method::DELETE, url, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        error_type: String,
        #[serde(default)]
        message: String,
    },
    Bare(String),
}

/// Map a non-success response to `AirtableError::Api`.
///
/// Bodies the service did not shape as `{"error": ...}` fall back to the
/// canonical status reason.
fn api_error(status: StatusCode, body: &[u8]) -> AirtableError {
    let fallback_type = status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace(' ', "_");

    let (error_type, message) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { error_type, message },
        }) => (error_type, message),
        Ok(ErrorEnvelope {
            error: ErrorBody::Bare(error_type),
        }) => (error_type, String::new()),
        Err(_) => (fallback_type, String::from_utf8_lossy(body).into_owned()),
    };

    AirtableError::Api {
        status: status.as_u16(),
        error_type,
        message,
    }
}
