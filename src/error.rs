//! Error types for the rotating sink
//!
//! Two distinct failure classes, matching where they can occur:
//!
//! - [`ConfigurationError`] - raised only at construction; fatal to the sink
//! - [`WriteError`] - raised on the emit/close path; propagated to the caller

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when constructing a sink
///
/// These are fatal: the caller must fix the configuration and build a new
/// sink instance.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The log directory could not be created
    #[error("failed to create log directory '{path}': {source}")]
    CreateDir {
        /// Directory we tried to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The base name is unusable as a filename suffix
    #[error("invalid base name '{name}': {reason}")]
    InvalidBaseName {
        /// The rejected base name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Errors raised on the emit/close path
///
/// Never swallowed and never retried internally; the caller (typically a
/// logger facade) decides whether to retry, escalate, or fall back.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Opening the bucket file failed
    #[error("failed to open log file '{path}': {source}")]
    Open {
        /// File we tried to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Appending a record failed
    #[error("failed to append to log file '{path}': {source}")]
    Append {
        /// File we tried to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Flushing buffered data failed
    #[error("failed to flush log file '{path}': {source}")]
    Flush {
        /// File we tried to flush
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The sink entered the failed state after an open failure and fails
    /// fast until reopened or reconstructed
    #[error("sink is unavailable after a failed rotation")]
    Unavailable,

    /// The sink was closed
    #[error("sink is closed")]
    Closed,
}
