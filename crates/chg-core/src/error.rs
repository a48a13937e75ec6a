//! Core error types for chg-core.
//!
//! Only reading the source document can fail inside this crate. Frame
//! lookup misses are not errors, and solver failures are carried by the
//! solver's own error type.

use std::path::PathBuf;

use thiserror::Error;

/// Core errors produced by the chg-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document file is not valid JSON.
    #[error("failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
