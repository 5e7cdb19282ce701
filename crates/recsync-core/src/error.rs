//! Error types for record reconciliation
//!
//! This module defines all error types used throughout the crate.
//!
//! Only two kinds stop a run: [`Error::AuthCredentialsMissing`] and
//! [`Error::ZoneResolutionFailed`]. Everything else is scoped to the record
//! that raised it and ends up in that record's outcome.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for record reconciliation
#[derive(Error, Debug)]
pub enum Error {
    /// No API token configured
    #[error("API credentials missing: set auth.apiToken or RECSYNC_API_TOKEN")]
    AuthCredentialsMissing,

    /// The hosted zone for the configured domain could not be resolved
    #[error("Zone resolution failed for {domain}: {reason}")]
    ZoneResolutionFailed {
        /// Configured domain
        domain: String,
        /// Underlying failure
        reason: String,
    },

    /// Record content starts with the placeholder marker but is malformed
    #[error("Invalid placeholder syntax in '{content}': expected #{{cf:SomeOutputKey}}")]
    InvalidPlaceholderSyntax {
        /// The offending content value
        content: String,
    },

    /// The referenced key is not among the stack's outputs
    #[error("Stack output not found: '{key}' in stack '{stack}'")]
    StackOutputNotFound {
        /// Stack that was searched
        stack: String,
        /// Output key that was requested
        key: String,
    },

    /// A remote call failed (non-2xx status, provider error, connect failure or timeout)
    #[error("Transport error (status {}): {body}", status_text(.status))]
    Transport {
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Response body or failure description
        body: String,
    },

    /// A forced update targeted a record that does not exist
    #[error("Record not found: {name} (type: {record_type})")]
    RecordNotFound {
        /// Record type
        record_type: String,
        /// Record name
        name: String,
    },

    /// Lookup returned nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_text(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl Error {
    /// Create a zone resolution error
    pub fn zone_resolution(domain: impl Into<String>, reason: impl ToString) -> Self {
        Self::ZoneResolutionFailed {
            domain: domain.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid placeholder error
    pub fn invalid_placeholder(content: impl Into<String>) -> Self {
        Self::InvalidPlaceholderSyntax {
            content: content.into(),
        }
    }

    /// Create a missing stack output error
    pub fn output_not_found(stack: impl Into<String>, key: impl Into<String>) -> Self {
        Self::StackOutputNotFound {
            stack: stack.into(),
            key: key.into(),
        }
    }

    /// Create a transport error
    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create the transport error used when a remote call exceeds its deadline
    pub fn timeout(after: Duration) -> Self {
        Self::transport(None, format!("request timed out after {:?}", after))
    }

    /// Create a "record not found" error
    pub fn record_not_found(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RecordNotFound {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborts the whole run rather than a single record
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthCredentialsMissing | Self::ZoneResolutionFailed { .. }
        )
    }
}
