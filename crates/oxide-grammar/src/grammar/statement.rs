//! Statement kinds and compiled output.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{ColumnExpr, InsertValues, QueryState, Record, UpsertColumn};
use crate::value::Value;

/// The kind of statement to compile from a query state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// SELECT.
    Select,
    /// Existence check.
    Exists,
    /// INSERT.
    Insert {
        /// Rows to insert.
        values: InsertValues,
    },
    /// INSERT skipping rows that violate a unique constraint.
    InsertOrIgnore {
        /// Rows to insert.
        values: InsertValues,
    },
    /// INSERT reporting the generated key.
    InsertGetId {
        /// Rows to insert.
        values: InsertValues,
        /// Name of the key column, `id` when absent.
        #[serde(default)]
        sequence: Option<String>,
    },
    /// INSERT fed by a SELECT.
    InsertUsing {
        /// Target columns; empty inserts every column.
        #[serde(default)]
        columns: Vec<ColumnExpr>,
        /// The feeding select.
        query: Box<QueryState>,
    },
    /// INSERT updating rows that already exist.
    Upsert {
        /// Rows to insert.
        values: InsertValues,
        /// Columns identifying an existing row.
        #[serde(default)]
        unique_by: Vec<String>,
        /// Columns written into an existing row.
        #[serde(default)]
        update: Vec<UpsertColumn>,
    },
    /// UPDATE.
    Update {
        /// Assignments.
        values: Record,
    },
    /// DELETE.
    Delete,
    /// TRUNCATE (or its dialect equivalent).
    Truncate,
}

/// SQL text and the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Bound values.
    pub bindings: Vec<Value>,
}

impl CompiledQuery {
    /// Pairs SQL with its bindings.
    #[must_use]
    pub fn new(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }

    pub(super) fn traced(
        dialect: &'static str,
        statement: &'static str,
        sql: String,
        bindings: Vec<Value>,
    ) -> Self {
        debug!(
            dialect,
            statement,
            sql = %sql,
            bindings = bindings.len(),
            "compiled statement"
        );
        Self::new(sql, bindings)
    }
}
