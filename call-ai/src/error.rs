//! Error types for provider operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common
/// variants.
///
/// All provider implementations map their native errors to these variants,
/// preserving context while keeping a provider-agnostic interface. Consumers
/// (the domain pipeline) decide per call site whether a variant is fatal,
/// item-fatal, or degradable.
#[derive(Debug)]
pub enum Error {
    /// OAuth or API key authentication failures. Credentials are invalid,
    /// expired, or lack necessary permissions.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    /// Typically transient.
    Network(String),

    /// Invalid parameters, missing required fields, or malformed
    /// configuration. Indicates a programming error.
    Configuration(String),

    /// Provider-side business logic errors (e.g. file not exportable,
    /// calendar not accessible).
    Provider(String),

    /// Requested resource (file, event) does not exist.
    NotFound(String),

    /// Provider rate limit exceeded; wait before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// The model returned an empty or structurally invalid response.
    /// Completions occasionally do this; callers must tolerate it.
    MalformedResponse(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
