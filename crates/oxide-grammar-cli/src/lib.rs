//! Command-line front end for `oxide-grammar`.
//!
//! A request is a JSON document naming a statement kind and carrying the
//! query state to compile:
//!
//! ```json
//! {
//!   "statement": { "kind": "update", "values": [["name", "Ada"]] },
//!   "query": { "from": "users", "wheres": [{ "node": { "type": "basic", "column": "id", "operator": "=", "value": 1 } }] }
//! }
//! ```
//!
//! The [`Compiler`] turns it into SQL for one dialect and renders the
//! statements as annotated text or JSON.

pub mod error;

use std::io::Read;
use std::path::Path;

use oxide_grammar::{CompiledQuery, DialectKind, Grammar, GrammarConfig, QueryState, Statement};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{CliError, Result};

/// A compilation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// What to compile. A select when absent.
    #[serde(default = "default_statement")]
    pub statement: Statement,
    /// The recorded query.
    pub query: QueryState,
}

const fn default_statement() -> Statement {
    Statement::Select
}

impl CompileRequest {
    /// Parses a request from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a request from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Reads a request from any reader, typically stdin.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// How compiled statements are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// SQL terminated by `;`, bindings in a trailing comment.
    #[default]
    Text,
    /// A JSON document with the dialect and every statement.
    Json,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    dialect: &'static str,
    statements: &'a [CompiledQuery],
}

/// Compiles requests for one dialect.
pub struct Compiler {
    kind: DialectKind,
    grammar: Box<dyn Grammar>,
}

impl Compiler {
    /// Creates a compiler for `kind` with the given configuration.
    #[must_use]
    pub fn new(kind: DialectKind, config: GrammarConfig) -> Self {
        Self {
            kind,
            grammar: kind.grammar(config),
        }
    }

    /// The dialect this compiler targets.
    #[must_use]
    pub const fn dialect(&self) -> DialectKind {
        self.kind
    }

    /// Compiles a request into one or more statements.
    pub fn compile(&self, request: &CompileRequest) -> Result<Vec<CompiledQuery>> {
        let statements = self.grammar.compile(&request.query, &request.statement)?;
        info!(
            dialect = %self.kind,
            statements = statements.len(),
            "Compiled request"
        );
        Ok(statements)
    }

    /// Renders compiled statements.
    ///
    /// With `inline` set, bindings are substituted into the SQL text. The
    /// result is meant for reading, not for execution.
    pub fn render(
        &self,
        statements: &[CompiledQuery],
        format: OutputFormat,
        inline: bool,
    ) -> Result<String> {
        let statements: Vec<CompiledQuery> = if inline {
            statements
                .iter()
                .map(|compiled| {
                    CompiledQuery::new(
                        self.grammar
                            .substitute_bindings_into_raw_sql(&compiled.sql, &compiled.bindings),
                        Vec::new(),
                    )
                })
                .collect()
        } else {
            statements.to_vec()
        };

        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonOutput {
                dialect: self.kind.as_str(),
                statements: &statements,
            })?),
            OutputFormat::Text => {
                let mut lines = Vec::new();
                for compiled in &statements {
                    lines.push(format!("{};", compiled.sql));
                    if !compiled.bindings.is_empty() {
                        lines.push(format!(
                            "-- bindings: {}",
                            serde_json::to_string(&compiled.bindings)?
                        ));
                    }
                }
                Ok(lines.join("\n"))
            }
        }
    }
}
