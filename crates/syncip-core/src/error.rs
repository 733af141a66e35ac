//! Error types for the syncip system
//!
//! The first four variants are cycle-scoped: a reconcile cycle that hits one
//! of them is aborted and reported, and the scheduler moves on to the next
//! tick. Everything else belongs to startup and glue code.

use thiserror::Error;

/// Result type alias for syncip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the syncip system
#[derive(Error, Debug)]
pub enum Error {
    /// The IP discovery service was unreachable or returned a bad response
    #[error("IP discovery error: {0}")]
    Discovery(String),

    /// DNS lookup failed, returned nothing, or returned more than one address
    #[error("DNS resolution error: {0}")]
    Resolution(String),

    /// Provider record lookup failed, found nothing, or was ambiguous
    #[error("DNS record lookup error: {0}")]
    RecordLookup(String),

    /// Provider mutation failed
    #[error("DNS record update error: {0}")]
    Update(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found (zone, record)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a DNS resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a record lookup error
    pub fn record_lookup(msg: impl Into<String>) -> Self {
        Self::RecordLookup(msg.into())
    }

    /// Create a record update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to a single reconcile cycle
    ///
    /// Cycle errors are logged and counted; they never stop the process.
    pub fn is_cycle_error(&self) -> bool {
        matches!(
            self,
            Self::Discovery(_) | Self::Resolution(_) | Self::RecordLookup(_) | Self::Update(_)
        )
    }
}
