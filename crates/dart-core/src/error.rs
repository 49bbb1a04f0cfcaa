//! Error types for disclosure lookups.
//!
//! This module defines [`DartError`] which covers every failure that can occur
//! while resolving a company, fetching a report, or touching a cache, and
//! [`ErrorKind`] which groups those failures into the conditions a caller acts on.

use thiserror::Error;

/// Errors that can occur during disclosure operations.
#[derive(Error, Debug)]
pub enum DartError {
    /// The identifier did not match any company in the corp-code table.
    #[error("Company not found: {0}")]
    CorpNotFound(String),

    /// The corp-code table could not be populated or persisted.
    #[error("Corp-code table initialization failed: {0}")]
    Initialization(String),

    /// Network-related errors (connection failures, timeouts, HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The provider answered with a non-success status of its own.
    #[error("Provider returned status {status}: {message}")]
    Api {
        /// Provider status code.
        status: String,
        /// Provider status message.
        message: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Caller-facing classification of a [`DartError`].
///
/// An empty record list is a successful answer and never maps to a kind here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The identifier did not resolve to a company.
    NotFound,
    /// The provider call itself failed.
    FetchFailure,
    /// The corp-code table could not be initialized.
    Initialization,
    /// The request was rejected before any external call.
    InvalidInput,
}

impl DartError {
    /// Returns the condition this error represents.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CorpNotFound(_) => ErrorKind::NotFound,
            Self::Initialization(_) => ErrorKind::Initialization,
            Self::InvalidParameter(_) | Self::ProviderNotConfigured(_) => ErrorKind::InvalidInput,
            Self::Network(_)
            | Self::RateLimited { .. }
            | Self::Api { .. }
            | Self::Parse(_)
            | Self::Cache(_)
            | Self::AuthenticationFailed(_)
            | Self::Other(_) => ErrorKind::FetchFailure,
        }
    }
}

/// Result type alias using [`DartError`].
pub type Result<T> = std::result::Result<T, DartError>;
