//! airtable-plus - A typed convenience layer over the Airtable REST API
//!
//! `AirtablePlus` wraps one table-scoped connection. Every operation takes a
//! per-call `ConfigOverride` (a table name, a `PartialConfig`, or
//! `ConfigOverride::None`) that is merged over the instance config for that
//! call only.
//!
//! ```ignore
//! use airtable_plus::{AirtablePlus, Config, ConfigOverride, ReadParams};
//!
//! let table = AirtablePlus::new(Config::new(api_key, "appXXXX", "Tasks"))?;
//! let open = table.read(ReadParams::matching("Status = 'Todo'"), ConfigOverride::None).await?;
//! let archived = table.read(ReadParams::new(), "Archive").await?;
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod formula;
pub mod observability;
pub mod params;
pub mod record;
pub mod table;

pub use client::{HttpTableClient, MemoryTableClient, RetryPolicy, TableClient};
pub use config::{Config, ConfigOverride, PartialConfig};
pub use errors::{AirtableError, AirtableResult};
pub use formula::format_column_filter;
pub use params::{CellFormat, Direction, ReadParams, SortField};
pub use record::{DeletedRecord, Fields, Page, Record};
pub use table::AirtablePlus;
