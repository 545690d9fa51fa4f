//! Error types for cqlpipe.
//!
//! `CqlError` covers everything that aborts the process. Per-statement
//! failures are `QueryError` values: they are reported and the input stream
//! keeps going.

use thiserror::Error;

/// Main error type for cqlpipe operations.
#[derive(Error, Debug)]
pub enum CqlError {
    /// Cluster, host or session establishment failed.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Configuration errors (invalid config file, bad host list, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent something the native protocol client cannot decode.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl CqlError {
    /// Creates a setup error with the given message.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Setup(_) => "Setup Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Protocol(_) => "Protocol Error",
        }
    }
}

/// Failure of a single statement.
///
/// The `Display` output is the exact line shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The server rejected the statement.
    #[error("Server error {code}: {message}")]
    Server { code: u32, message: String },

    /// The client could not run the statement (transport, decoding, etc.)
    #[error("Client error: {0}")]
    Client(String),
}

impl QueryError {
    /// Creates a server error from an error code and message.
    pub fn server(code: u32, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Creates a client error with the given message.
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }
}

impl From<CqlError> for QueryError {
    fn from(err: CqlError) -> Self {
        Self::Client(err.to_string())
    }
}

/// Result type alias using CqlError.
pub type Result<T> = std::result::Result<T, CqlError>;
