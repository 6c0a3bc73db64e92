//! # Table Clients
//!
//! The single-record and list-page calls the façade delegates to. Every
//! call receives the merged per-call `Config`, so one client instance can
//! serve any base, table or API key.

mod http;
mod memory;
mod retry;

pub use http::{HttpTableClient, API_VERSION};
pub use memory::MemoryTableClient;
pub use retry::RetryPolicy;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::AirtableResult;
use crate::params::ReadParams;
use crate::record::{DeletedRecord, Fields, Page, Record};

/// Underlying service operations
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Fetch one page of a listing, resuming at `offset` when given
    async fn list_page(
        &self,
        config: &Config,
        params: &ReadParams,
        offset: Option<&str>,
    ) -> AirtableResult<Page>;

    /// Fetch one record by ID
    async fn get(&self, config: &Config, id: &str) -> AirtableResult<Record>;

    /// Create one record
    async fn create(&self, config: &Config, fields: &Fields) -> AirtableResult<Record>;

    /// Update the given fields, leaving the others untouched
    async fn update(&self, config: &Config, id: &str, fields: &Fields) -> AirtableResult<Record>;

    /// Replace all fields; fields not given are cleared
    async fn replace(&self, config: &Config, id: &str, fields: &Fields)
        -> AirtableResult<Record>;

    /// Delete one record
    async fn destroy(&self, config: &Config, id: &str) -> AirtableResult<DeletedRecord>;
}

#[async_trait]
impl<T: TableClient + ?Sized> TableClient for Arc<T> {
    async fn list_page(
        &self,
        config: &Config,
        params: &ReadParams,
        offset: Option<&str>,
    ) -> AirtableResult<Page> {
        (**self).list_page(config, params, offset).await
    }

    async fn get(&self, config: &Config, id: &str) -> AirtableResult<Record> {
        (**self).get(config, id).await
    }

    async fn create(&self, config: &Config, fields: &Fields) -> AirtableResult<Record> {
        (**self).create(config, fields).await
    }

    async fn update(&self, config: &Config, id: &str, fields: &Fields) -> AirtableResult<Record> {
        (**self).update(config, id, fields).await
    }

    async fn replace(
        &self,
        config: &Config,
        id: &str,
        fields: &Fields,
    ) -> AirtableResult<Record> {
        (**self).replace(config, id, fields).await
    }

    async fn destroy(&self, config: &Config, id: &str) -> AirtableResult<DeletedRecord> {
        (**self).destroy(config, id).await
    }
}
