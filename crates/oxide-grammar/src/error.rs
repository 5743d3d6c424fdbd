//! Error types for SQL compilation.

/// Errors that can occur while compiling a query state.
///
/// Compilation is atomic: when any of these is returned no SQL was produced.
/// None of them are transient, they all point at a query that was put
/// together incorrectly or at a dialect that cannot express it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// The dialect lacks the requested capability.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// Name of the dialect that rejected the request.
        dialect: &'static str,
        /// The capability that was requested.
        feature: &'static str,
    },

    /// The query state is structurally invalid.
    #[error("Malformed query state: {0}")]
    MalformedState(String),

    /// A combination of options the grammar refuses to render.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl GrammarError {
    /// Creates an [`GrammarError::Unsupported`] error.
    #[must_use]
    pub const fn unsupported(dialect: &'static str, feature: &'static str) -> Self {
        Self::Unsupported { dialect, feature }
    }

    /// Creates a [`GrammarError::MalformedState`] error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedState(message.into())
    }

    /// Creates a [`GrammarError::InvalidOption`] error.
    #[must_use]
    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }
}

/// Result type for grammar operations.
pub type Result<T> = std::result::Result<T, GrammarError>;
