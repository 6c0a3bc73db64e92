//! # Airtable Errors
//!
//! Error types shared by the façade, the config layer and the clients.

use thiserror::Error;

/// Result type for Airtable operations
pub type AirtableResult<T> = Result<T, AirtableError>;

/// Airtable errors
#[derive(Debug, Error)]
pub enum AirtableError {
    // ==================
    // Caller Errors
    // ==================
    /// A required argument was missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration incomplete or malformed
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ==================
    // Service Errors
    // ==================
    /// The service answered with a non-success status
    #[error("Airtable API error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    /// Rate limited and retries were disabled or exhausted
    #[error("Rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    // ==================
    // Transport Errors
    // ==================
    /// Network or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AirtableError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "AIRTABLE_INVALID_ARGUMENT",
            Self::Config(_) => "AIRTABLE_CONFIG",
            Self::Api { .. } => "AIRTABLE_API",
            Self::RateLimited { .. } => "AIRTABLE_RATE_LIMITED",
            Self::Transport(_) => "AIRTABLE_TRANSPORT",
            Self::Decode(_) => "AIRTABLE_DECODE",
            Self::Io(_) => "AIRTABLE_IO",
        }
    }

    /// HTTP status reported by the service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the service reported the record or table as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AirtableError::invalid_argument("data").code(),
            "AIRTABLE_INVALID_ARGUMENT"
        );
        assert_eq!(AirtableError::config("apiKey").code(), "AIRTABLE_CONFIG");
        assert_eq!(
            AirtableError::RateLimited { attempts: 3 }.code(),
            "AIRTABLE_RATE_LIMITED"
        );
    }

    #[test]
    fn test_api_error_classification() {
        let not_found = AirtableError::Api {
            status: 404,
            error_type: "NOT_FOUND".to_string(),
            message: "Could not find what you are looking for".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.status(), Some(404));

        let unavailable = AirtableError::Api {
            status: 503,
            error_type: "SERVICE_UNAVAILABLE".to_string(),
            message: String::new(),
        };
        assert!(unavailable.is_retryable());
    }

    #[test]
    fn test_display_includes_type() {
        let err = AirtableError::Api {
            status: 422,
            error_type: "INVALID_REQUEST_UNKNOWN".to_string(),
            message: "Invalid request".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("INVALID_REQUEST_UNKNOWN"));
    }

    #[test]
    fn test_caller_errors_not_retryable() {
        assert!(!AirtableError::invalid_argument("key").is_retryable());
        assert_eq!(AirtableError::invalid_argument("key").status(), None);
    }
}
