//! Grammar configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, Result};

/// Options shared by every grammar.
///
/// Each dialect reads only the options that concern it; the rest are
/// ignored. Every field has a default so a partial JSON document is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Prefix prepended to every table name (and table alias).
    pub table_prefix: String,
    /// PostgreSQL: append `cascade` to TRUNCATE.
    pub cascade_truncate: bool,
    /// MySQL: reference incoming upsert rows through a row alias instead of
    /// the deprecated `values()` function.
    pub use_upsert_alias: bool,
    /// SQL Server: paginate with `row_number()` instead of
    /// `offset ... fetch next`, for servers older than 2012.
    pub legacy_pagination: bool,
}

impl GrammarConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Sets the PostgreSQL cascading truncate option.
    #[must_use]
    pub const fn with_cascade_truncate(mut self, cascade: bool) -> Self {
        self.cascade_truncate = cascade;
        self
    }

    /// Sets the MySQL upsert alias option.
    #[must_use]
    pub const fn with_upsert_alias(mut self, enabled: bool) -> Self {
        self.use_upsert_alias = enabled;
        self
    }

    /// Sets the SQL Server legacy pagination option.
    #[must_use]
    pub const fn with_legacy_pagination(mut self, enabled: bool) -> Self {
        self.legacy_pagination = enabled;
        self
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| GrammarError::invalid_option(format!("configuration: {e}")))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GrammarError::invalid_option(format!("configuration {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GrammarConfig::from_json(r#"{"table_prefix": "app_"}"#).unwrap();
        assert_eq!(config, GrammarConfig::new().with_table_prefix("app_"));
        assert!(!config.cascade_truncate);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = GrammarConfig::from_json("{\"table_prefix\": 3}").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidOption(_)));
    }
}
