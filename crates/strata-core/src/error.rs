//! Error types for Strata

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by the underlying object-storage client
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    // Input Errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Catalog Errors
    #[error("Malformed path pattern '{pattern}' for catalog '{catalog}': {reason}")]
    MalformedPattern {
        catalog: String,
        pattern: String,
        reason: String,
    },

    #[error("Catalog '{catalog}' expects {expected}")]
    SelectorMismatch {
        catalog: String,
        expected: &'static str,
    },

    // Object Store Errors
    #[error("{operation}: {message}")]
    Client {
        operation: String,
        message: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an object-store failure with the client call that produced it
    pub fn client(operation: &str, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Error::Client {
            operation: operation.to_string(),
            message: source.to_string(),
            source,
        }
    }

    /// Like [`Error::client`], keeping a message the caller rendered with more context
    pub fn client_with_message(
        operation: &str,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Client {
            operation: operation.to_string(),
            message: message.into(),
            source: source.into(),
        }
    }

    /// Prefix a client failure with the facade operation that issued the call.
    ///
    /// Other variants pass through untouched so their kind survives.
    pub fn in_operation(self, name: &str) -> Self {
        match self {
            Error::Client {
                operation,
                message,
                source,
            } => Error::Client {
                operation: format!("{}/{}", name, operation),
                message,
                source,
            },
            other => other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "InvalidInput",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::MalformedPattern { .. } => "MalformedPattern",
            Error::SelectorMismatch { .. } => "SelectorMismatch",
            Error::Client { .. } => "ClientError",
            Error::Io(_) => "IoError",
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
