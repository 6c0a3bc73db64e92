//! "Where" operations and upsert
//!
//! Each one reads the rows matching a formula, then issues one single-record
//! call per row. The per-row calls run concurrently and every one of them is
//! driven to completion, even after a sibling fails. The first failure in row
//! order is then returned; rows whose call succeeded stay written.

use std::future::Future;

use futures_util::future::join_all;

use super::{shape, AirtablePlus};
use crate::client::TableClient;
use crate::config::{Config, ConfigOverride};
use crate::errors::{AirtableError, AirtableResult};
use crate::formula;
use crate::observability::{Event, Logger, OperationScope};
use crate::params::ReadParams;
use crate::record::{DeletedRecord, Fields, Record};

impl<C: TableClient> AirtablePlus<C> {
    /// Update the given fields of every row matching `formula`
    pub async fn update_where(
        &self,
        formula: &str,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<Record>> {
        require_formula(formula)?;
        let config = self.resolve(overrides.into())?;
        let scope = OperationScope::begin("UPDATE_WHERE", &config.table_name);
        scope.finish(self.update_matching(&config, formula, &data).await)
    }

    /// Replace every field of every row matching `formula`
    pub async fn replace_where(
        &self,
        formula: &str,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<Record>> {
        require_formula(formula)?;
        let config = self.resolve(overrides.into())?;
        let scope = OperationScope::begin("REPLACE_WHERE", &config.table_name);
        scope.finish(self.replace_matching(&config, formula, &data).await)
    }

    /// Delete every row matching `formula`
    pub async fn delete_where(
        &self,
        formula: &str,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<DeletedRecord>> {
        require_formula(formula)?;
        let config = self.resolve(overrides.into())?;
        let scope = OperationScope::begin("DELETE_WHERE", &config.table_name);
        scope.finish(self.delete_matching(&config, formula).await)
    }

    /// Delete every row of the table
    pub async fn truncate(
        &self,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<DeletedRecord>> {
        let config = self.resolve(overrides.into())?;
        let scope = OperationScope::begin("TRUNCATE", &config.table_name);
        scope.finish(self.delete_matching(&config, "").await)
    }

    /// Create a record unless a row already has `data[key]` in column `key`;
    /// otherwise update every such row.
    ///
    /// Fails with `InvalidArgument` when `key` or `data` is empty, or when
    /// `data` has no value for `key`.
    pub async fn upsert(
        &self,
        key: &str,
        data: Fields,
        overrides: impl Into<ConfigOverride>,
    ) -> AirtableResult<Vec<Record>> {
        if key.trim().is_empty() || data.is_empty() {
            return Err(AirtableError::invalid_argument(
                "Key and data are required for upsert",
            ));
        }
        let value = data.get(key).ok_or_else(|| {
            AirtableError::invalid_argument(format!("data has no value for key column '{}'", key))
        })?;
        let lookup = formula::equals(key, value);

        let config = self.resolve(overrides.into())?;
        let scope = OperationScope::begin("UPSERT", &config.table_name);

        scope.finish(self.upsert_matching(&config, &lookup, &data).await)
    }

    async fn matching(&self, config: &Config, formula: &str) -> AirtableResult<Vec<Record>> {
        let rows = self
            .read_all(config, &ReadParams::matching(formula))
            .await?;

        let count = rows.len().to_string();
        Logger::event(
            Event::WhereMatched,
            &[
                ("formula", formula),
                ("records", &count),
                ("table", &config.table_name),
            ],
        );
        Ok(rows)
    }

    async fn update_matching(
        &self,
        config: &Config,
        formula: &str,
        data: &Fields,
    ) -> AirtableResult<Vec<Record>> {
        let rows = self.matching(config, formula).await?;
        let updated = settle_all(
            rows.iter()
                .map(|row| self.client.update(config, &row.id, data)),
        )
        .await?;
        Ok(updated.into_iter().map(|r| shape(config, r)).collect())
    }

    async fn replace_matching(
        &self,
        config: &Config,
        formula: &str,
        data: &Fields,
    ) -> AirtableResult<Vec<Record>> {
        let rows = self.matching(config, formula).await?;
        let replaced = settle_all(
            rows.iter()
                .map(|row| self.client.replace(config, &row.id, data)),
        )
        .await?;
        Ok(replaced.into_iter().map(|r| shape(config, r)).collect())
    }

    async fn upsert_matching(
        &self,
        config: &Config,
        lookup: &str,
        data: &Fields,
    ) -> AirtableResult<Vec<Record>> {
        let rows = self.matching(config, lookup).await?;
        if rows.is_empty() {
            let created = self.client.create(config, data).await?;
            Logger::event(
                Event::UpsertCreated,
                &[("id", &created.id), ("table", &config.table_name)],
            );
            return Ok(vec![shape(config, created)]);
        }

        let count = rows.len().to_string();
        Logger::event(
            Event::UpsertUpdated,
            &[("records", &count), ("table", &config.table_name)],
        );
        let updated = settle_all(
            rows.iter()
                .map(|row| self.client.update(config, &row.id, data)),
        )
        .await?;
        Ok(updated.into_iter().map(|r| shape(config, r)).collect())
    }

    async fn delete_matching(
        &self,
        config: &Config,
        formula: &str,
    ) -> AirtableResult<Vec<DeletedRecord>> {
        let rows = self.matching(config, formula).await?;
        settle_all(rows.iter().map(|row| self.client.destroy(config, &row.id))).await
    }
}

/// Await every call, then report the first failure in input order
async fn settle_all<T, F>(calls: impl IntoIterator<Item = F>) -> AirtableResult<Vec<T>>
where
    F: Future<Output = AirtableResult<T>>,
{
    join_all(calls).await.into_iter().collect()
}

/// An empty formula would select the whole table; `truncate` says so explicitly
fn require_formula(formula: &str) -> AirtableResult<()> {
    if formula.trim().is_empty() {
        return Err(AirtableError::invalid_argument(
            "A formula is required; use truncate to delete every row",
        ));
    }
    Ok(())
}
