//! Error handling types
//!
//! Contention is never an error: a busy key or a release by a non-owner is
//! reported through [`AcquireOutcome`](crate::ports::AcquireOutcome) and
//! [`ReleaseOutcome`](crate::ports::ReleaseOutcome). The variants below cover
//! failures that must reach the caller.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dlock
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// The lock store could not be reached or rejected a command.
    ///
    /// Never produced for a busy key; a down store must stay
    /// distinguishable from contention.
    #[error("Lock store error: {message}")]
    Store {
        /// Description of the store failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A guarded operation could not acquire its lock
    #[error("Failed to acquire distributed lock for key={key}")]
    LockNotAcquired {
        /// The derived lock key
        key: String,
    },

    /// Key expression could not be evaluated
    #[error("Expression error in '{expression}': {message}")]
    Expression {
        /// The offending expression
        expression: String,
        /// What went wrong
        message: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create a store error without a source
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping the transport failure
    pub fn store_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a lock-not-acquired error
    pub fn lock_not_acquired<S: Into<String>>(key: S) -> Self {
        Self::LockNotAcquired { key: key.into() }
    }

    /// Create an expression error
    pub fn expression<E: Into<String>, M: Into<String>>(expression: E, message: M) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the lock store transport
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}
