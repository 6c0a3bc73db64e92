//! # Table Façade
//!
//! `AirtablePlus` binds a `Config` to a `TableClient`. Every operation
//! merges its per-call override over the instance config, delegates to the
//! client and reshapes the response.

mod bulk;

use crate::client::{HttpTableClient, TableClient};
use crate::config::{Config, ConfigOverride};
use crate::errors::{AirtableError, AirtableResult};
use crate::formula;
use crate::observability::{Event, Logger};
use crate::params::ReadParams;
use crate::record::{DeletedRecord, Fields, Record};

/// Table-scoped façade over the Airtable API
pub struct AirtablePlus<C: TableClient = HttpTableClient> {
    config: Config,
    client: C,
}

impl AirtablePlus<HttpTableClient> {
    /// Create a façade talking HTTP to `config.endpoint_url`
    pub fn new(config: Config) -> AirtableResult<Self> {
        Ok(Self::with_client(config, HttpTableClient::new()?))
    }

    /// Create a façade configured from the `AIRTABLE_*` environment variables
    pub fn from_env() -> AirtableResult<Self> {
        Self::new(Config::from_env())
    }
}

impl<C: TableClient> AirtablePlus<C> {
    /// Create a façade over any client
    pub fn with_client(config: Config, client: C) -> Self {
        Self { config, client }
    }

    /// Instance-level defaults
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Wrap a column name in braces when it has whitespace
    pub fn format_column_filter(&self, column: &str) -> String {
        formula::format_column_filter(column)
    }

    /// Create one record.
    ///
    /// Fails with `InvalidArgument` when `data` is empty.
    pub async fn create(
        &self,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Record> {
        if data.is_empty() {
            return Err(AirtableError::invalid_argument(
                "No data was provided for create",
            ));
        }
        let config = self.resolve(overrides.into())?;
        let record = self.client.create(&config, &data).await?;
        Ok(shape(&config, record))
    }

    /// Read every matching record, concatenating all pages in order
    pub async fn read(
        &self,
        params: ReadParams,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<Record>> {
        let config = self.resolve(overrides.into())?;
        let records = self.read_all(&config, &params).await?;
        Ok(records.into_iter().map(|r| shape(&config, r)).collect())
    }

    /// Fetch one record by ID
    pub async fn find(
        &self,
        id: &str,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Record> {
        require_id(id)?;
        let config = self.resolve(overrides.into())?;
        let record = self.client.get(&config, id).await?;
        Ok(shape(&config, record))
    }

    /// Update the given fields of one record
    pub async fn update(
        &self,
        id: &str,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Record> {
        require_id(id)?;
        let config = self.resolve(overrides.into())?;
        let record = self.client.update(&config, id, &data).await?;
        Ok(shape(&config, record))
    }

    /// Replace every field of one record; omitted fields are cleared
    pub async fn replace(
        &self,
        id: &str,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Record> {
        require_id(id)?;
        let config = self.resolve(overrides.into())?;
        let record = self.client.replace(&config, id, &data).await?;
        Ok(shape(&config, record))
    }

    /// Delete one record
    pub async fn delete(
        &self,
        id: &str,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<DeletedRecord> {
        require_id(id)?;
        let config = self.resolve(overrides.into())?;
        self.client.destroy(&config, id).await
    }

    /// Merge the override and run presence checks
    fn resolve(&self, overrides: ConfigOverride) -> AirtableResult<Config> {
        let config = self.config.merge(&overrides);
        config.validate()?;
        Ok(config)
    }

    /// Follow offsets until the last page; records are left unshaped
    async fn read_all(&self, config: &Config, params: &ReadParams) -> AirtableResult<Vec<Record>> {
        params.validate()?;

        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages: usize = 0;

        loop {
            let page = self
                .client
                .list_page(config, params, offset.as_deref())
                .await?;
            pages += 1;

            let page_no = pages.to_string();
            let count = page.records.len().to_string();
            Logger::event(
                Event::PageFetched,
                &[
                    ("page", &page_no),
                    ("records", &count),
                    ("table", &config.table_name),
                ],
            );

            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}

fn require_id(id: &str) -> AirtableResult<()> {
    if id.trim().is_empty() {
        return Err(AirtableError::invalid_argument("A record id is required"));
    }
    Ok(())
}

/// Apply response shaping selected by the merged config
fn shape(config: &Config, record: Record) -> Record {
    if config.camel_case {
        record.into_camel_case()
    } else {
        record
    }
}
