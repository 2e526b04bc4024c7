//! Error types for loading scripts.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for script loading.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that stop a script from being loaded at all.
///
/// Authoring defects are not errors; they are diagnostics in a report.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The script is not valid UTF-8 and cannot be split into lines.
    #[error("{name} is not valid UTF-8: {source}")]
    Encoding {
        /// Script name.
        name: String,
        /// The decoding error.
        source: std::str::Utf8Error,
    },

    /// The script parsed but has error-severity diagnostics.
    #[error("{name} has {errors} error(s)")]
    Rejected {
        /// Script name.
        name: String,
        /// Number of error diagnostics.
        errors: usize,
    },
}
