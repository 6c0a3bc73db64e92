//! Observability for airtable-plus
//!
//! - Structured logging (JSON, one line per event)
//! - Typed event names
//! - Lifecycle scopes around bulk operations
//!
//! # Usage
//!
//! ```ignore
//! use airtable_plus::observability::{Logger, Severity};
//!
//! // Show per-request traces
//! Logger::set_min_severity(Severity::Trace);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::OperationScope;
