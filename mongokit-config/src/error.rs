//! Error types for MongoDB configuration and operation classification.

// The fields are read by the derive macros.
#![allow(unused_assignments)]

use miette::Diagnostic;
use mongodb::error::ErrorKind;
use thiserror::Error;

/// Result type for MongoDB configuration and operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors surfaced by this crate, or lifted from the MongoDB driver.
///
/// Server command errors get their own variant so callers can inspect the
/// reported code with a plain `match` instead of downcasting.
#[derive(Error, Debug, Diagnostic)]
pub enum MongoError {
    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(mongokit::config::invalid))]
    Config { message: String },

    /// Command error reported by the server.
    #[error("command failed ({code_name}, code {code}): {message}")]
    #[diagnostic(code(mongokit::command))]
    Command {
        code: i32,
        code_name: String,
        message: String,
    },

    /// Any other MongoDB driver error.
    #[error("mongodb error: {0}")]
    #[diagnostic(code(mongokit::driver))]
    Driver(#[source] mongodb::error::Error),

    /// Connection error.
    #[error("connection error: {0}")]
    #[diagnostic(code(mongokit::connection))]
    Connection(String),

    /// Timeout error.
    #[error("operation timed out after {0}ms")]
    #[diagnostic(code(mongokit::timeout))]
    Timeout(u64),

    /// Failed to read a settings file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(mongokit::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for a [`MongoConfig`](crate::MongoConfig).
    #[error("invalid settings: {0}")]
    #[diagnostic(code(mongokit::config::toml))]
    Toml(#[from] toml::de::Error),
}

impl MongoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a server command error.
    pub fn command(code: i32, code_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            code,
            code_name: code_name.into(),
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Check if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The server-reported command code, if this error carries one.
    pub fn command_code(&self) -> Option<i32> {
        match self {
            Self::Command { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the operation that produced this error may be retried.
    ///
    /// See [`should_retry`](crate::retry::should_retry).
    pub fn is_retryable(&self) -> bool {
        crate::retry::should_retry(self)
    }
}

impl From<mongodb::error::Error> for MongoError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Command(cmd) => {
                MongoError::command(cmd.code, cmd.code_name.clone(), cmd.message.clone())
            }
            _ => MongoError::Driver(err),
        }
    }
}
