//! Error types for the command-line front end.

use std::path::PathBuf;

use oxide_grammar::GrammarError;

/// Errors that can occur while compiling a request.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The grammar refused the request.
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// A request file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Path of the request file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
