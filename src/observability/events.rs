//! Observable events for airtable-plus
//!
//! Every log line the crate emits is named by one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Requests
    /// HTTP request sent
    RequestSent,
    /// HTTP response received
    ResponseReceived,
    /// Service answered 429 and the request will be retried
    RateLimitRetry,
    /// Service answered 429 and retries are disabled or exhausted
    RateLimitExhausted,
    /// Request failed
    RequestFailed,

    // Reads
    /// One page of a listing fetched
    PageFetched,

    // Bulk operations
    /// Matching rows selected for a "where" operation
    WhereMatched,
    /// Upsert created a record because nothing matched
    UpsertCreated,
    /// Upsert updated every matching record
    UpsertUpdated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RequestSent => "REQUEST_SENT",
            Event::ResponseReceived => "RESPONSE_RECEIVED",
            Event::RateLimitRetry => "RATE_LIMIT_RETRY",
            Event::RateLimitExhausted => "RATE_LIMIT_EXHAUSTED",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::PageFetched => "PAGE_FETCHED",
            Event::WhereMatched => "WHERE_MATCHED",
            Event::UpsertCreated => "UPSERT_CREATED",
            Event::UpsertUpdated => "UPSERT_UPDATED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RequestSent | Event::ResponseReceived | Event::PageFetched => Severity::Trace,
            Event::WhereMatched | Event::UpsertCreated | Event::UpsertUpdated => Severity::Info,
            Event::RateLimitRetry => Severity::Warn,
            Event::RateLimitExhausted | Event::RequestFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
