//! Error types for mailflow.
//!
//! Generation failures are deliberately NOT represented here: the pipeline
//! carries them as sentinel-prefixed strings (see `llm::ERROR_PREFIXES`) so
//! a failed stage flows downstream as data instead of aborting a cycle.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration-related errors. Missing required variables are fatal at
/// startup, before any polling begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// IMAP transport errors. Caught at the polling-loop boundary and handled
/// with a reconnect-and-continue policy.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Connection to {host}:{port} failed: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Login rejected for {user}")]
    LoginRejected { user: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unparseable message {id}")]
    UnparseableMessage { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Artifact persistence errors. Logged and dropped per-file; the pipeline
/// result itself is never lost to a write failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write artifact {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
