//! Boolean clause trees for WHERE, ON and HAVING.

use serde::{Deserialize, Serialize};

use super::{ColumnExpr, QueryState};
use crate::value::{ToSqlValue, Value};

/// Connective placed before a clause.
///
/// The connective of the first clause in a group is stripped on render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boolean {
    /// `and`
    #[default]
    #[serde(rename = "and")]
    And,
    /// `or`
    #[serde(rename = "or")]
    Or,
    /// `and not`
    #[serde(rename = "and not")]
    AndNot,
    /// `or not`
    #[serde(rename = "or not")]
    OrNot,
}

impl Boolean {
    /// Returns the SQL text of the connective.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::AndNot => "and not",
            Self::OrNot => "or not",
        }
    }
}

/// One clause of a tree together with its connective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause<N> {
    /// Connective joining this clause to the previous one.
    #[serde(default)]
    pub boolean: Boolean,
    /// The clause itself.
    pub node: N,
}

/// Ordered list of clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClauseTree<N> {
    clauses: Vec<Clause<N>>,
}

impl<N> Default for ClauseTree<N> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }
}

impl<N> ClauseTree<N> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clause.
    pub fn push(&mut self, boolean: Boolean, node: N) {
        self.clauses.push(Clause { boolean, node });
    }

    /// Appends a clause joined with `and`.
    #[must_use]
    pub fn and(mut self, node: N) -> Self {
        self.push(Boolean::And, node);
        self
    }

    /// Appends a clause joined with `or`.
    #[must_use]
    pub fn or(mut self, node: N) -> Self {
        self.push(Boolean::Or, node);
        self
    }

    /// Appends a clause with an explicit connective.
    #[must_use]
    pub fn with(mut self, boolean: Boolean, node: N) -> Self {
        self.push(boolean, node);
        self
    }

    /// Returns true if the tree holds no clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of top-level clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Iterates over the top-level clauses.
    pub fn iter(&self) -> std::slice::Iter<'_, Clause<N>> {
        self.clauses.iter()
    }
}

impl<'a, N> IntoIterator for &'a ClauseTree<N> {
    type Item = &'a Clause<N>;
    type IntoIter = std::slice::Iter<'a, Clause<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Tree of WHERE (or join ON) clauses.
pub type WhereTree = ClauseTree<WhereNode>;

/// Tree of HAVING clauses.
pub type HavingTree = ClauseTree<HavingNode>;

/// Part of a date-time column compared by [`WhereNode::Date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePart {
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Day of month.
    Day,
    /// Month number.
    Month,
    /// Four digit year.
    Year,
}

impl DatePart {
    /// Lowercase name of the part, also the SQL function name of the base
    /// rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Right-hand side of an IN clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InValues {
    /// A list of bound values.
    List(Vec<Value>),
    /// A sub-select.
    Query(Box<QueryState>),
}

/// Options of a full-text predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullTextOptions {
    /// Search mode: `boolean` on MySQL; `phrase` or `websearch` on
    /// PostgreSQL. Anything else uses the natural/plain mode.
    pub mode: Option<String>,
    /// MySQL query expansion.
    pub expanded: bool,
    /// PostgreSQL text search configuration.
    pub language: Option<String>,
}

/// A single WHERE predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WhereNode {
    /// Verbatim SQL with its own bindings.
    Raw {
        /// SQL fragment.
        sql: String,
        /// Values bound by the fragment.
        #[serde(default)]
        bindings: Vec<Value>,
    },
    /// `column operator value`
    Basic {
        /// Column.
        column: ColumnExpr,
        /// Comparison operator.
        operator: String,
        /// Compared value.
        value: Value,
    },
    /// Bitwise comparison.
    Bitwise {
        /// Column.
        column: ColumnExpr,
        /// Bitwise operator.
        operator: String,
        /// Compared value.
        value: Value,
    },
    /// Comparison of a JSON path against a boolean literal.
    JsonBoolean {
        /// JSON selector (`column->path`).
        column: String,
        /// Comparison operator.
        operator: String,
        /// Boolean literal.
        value: bool,
    },
    /// `like` predicate.
    Like {
        /// Column.
        column: ColumnExpr,
        /// Pattern.
        value: Value,
        /// Case-sensitive matching.
        #[serde(default)]
        case_sensitive: bool,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `between` two values.
    Between {
        /// Column.
        column: ColumnExpr,
        /// Lower bound.
        min: Value,
        /// Upper bound.
        max: Value,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `between` two columns.
    BetweenColumns {
        /// Column.
        column: ColumnExpr,
        /// Lower bound column.
        min: ColumnExpr,
        /// Upper bound column.
        max: ColumnExpr,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `in` list or sub-select.
    In {
        /// Column.
        column: ColumnExpr,
        /// Members.
        values: InValues,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `in` list of integers, inlined.
    InRaw {
        /// Column.
        column: ColumnExpr,
        /// Members.
        values: Vec<i64>,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `is null`
    Null {
        /// Column.
        column: ColumnExpr,
    },
    /// `is not null`
    NotNull {
        /// Column.
        column: ColumnExpr,
    },
    /// Comparison of one part of a date-time column.
    Date {
        /// Compared part.
        part: DatePart,
        /// Column.
        column: ColumnExpr,
        /// Comparison operator.
        operator: String,
        /// Compared value.
        value: Value,
    },
    /// Parenthesized group.
    Nested {
        /// Clauses of the group.
        wheres: WhereTree,
    },
    /// `exists (sub-select)`
    Exists {
        /// Sub-select.
        query: Box<QueryState>,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `column operator (sub-select)`
    Sub {
        /// Column.
        column: ColumnExpr,
        /// Comparison operator.
        operator: String,
        /// Sub-select.
        query: Box<QueryState>,
    },
    /// `first operator second`
    Column {
        /// Left column.
        first: ColumnExpr,
        /// Comparison operator.
        operator: String,
        /// Right column.
        second: ColumnExpr,
    },
    /// `(a, b) operator (?, ?)`
    RowValues {
        /// Columns.
        columns: Vec<ColumnExpr>,
        /// Comparison operator.
        operator: String,
        /// Values, one per column.
        values: Vec<Value>,
    },
    /// JSON document containment.
    JsonContains {
        /// JSON selector.
        column: String,
        /// Contained value.
        value: Value,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// JSON key existence.
    JsonContainsKey {
        /// JSON selector ending in the key.
        column: String,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// JSON array length comparison.
    JsonLength {
        /// JSON selector.
        column: String,
        /// Comparison operator.
        operator: String,
        /// Compared length.
        value: Value,
    },
    /// Full-text search.
    FullText {
        /// Indexed columns.
        columns: Vec<ColumnExpr>,
        /// Search terms.
        value: Value,
        /// Search options.
        #[serde(default)]
        options: FullTextOptions,
    },
}

impl WhereNode {
    /// `column operator value`
    #[must_use]
    pub fn basic(column: impl Into<ColumnExpr>, operator: &str, value: impl ToSqlValue) -> Self {
        Self::Basic {
            column: column.into(),
            operator: operator.to_owned(),
            value: value.to_sql_value(),
        }
    }

    /// `column = value`
    #[must_use]
    pub fn eq(column: impl Into<ColumnExpr>, value: impl ToSqlValue) -> Self {
        Self::basic(column, "=", value)
    }

    /// Verbatim SQL.
    #[must_use]
    pub fn raw(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            bindings,
        }
    }

    /// `column in (values)`
    #[must_use]
    pub fn in_list<T: ToSqlValue>(column: impl Into<ColumnExpr>, values: Vec<T>) -> Self {
        Self::In {
            column: column.into(),
            values: InValues::List(values.into_iter().map(ToSqlValue::to_sql_value).collect()),
            not: false,
        }
    }

    /// `column not in (values)`
    #[must_use]
    pub fn not_in_list<T: ToSqlValue>(column: impl Into<ColumnExpr>, values: Vec<T>) -> Self {
        Self::In {
            column: column.into(),
            values: InValues::List(values.into_iter().map(ToSqlValue::to_sql_value).collect()),
            not: true,
        }
    }

    /// `column in (sub-select)`
    #[must_use]
    pub fn in_query(column: impl Into<ColumnExpr>, query: QueryState) -> Self {
        Self::In {
            column: column.into(),
            values: InValues::Query(Box::new(query)),
            not: false,
        }
    }

    /// `column between min and max`
    #[must_use]
    pub fn between(
        column: impl Into<ColumnExpr>,
        min: impl ToSqlValue,
        max: impl ToSqlValue,
    ) -> Self {
        Self::Between {
            column: column.into(),
            min: min.to_sql_value(),
            max: max.to_sql_value(),
            not: false,
        }
    }

    /// `column is null`
    #[must_use]
    pub fn null(column: impl Into<ColumnExpr>) -> Self {
        Self::Null {
            column: column.into(),
        }
    }

    /// `column is not null`
    #[must_use]
    pub fn not_null(column: impl Into<ColumnExpr>) -> Self {
        Self::NotNull {
            column: column.into(),
        }
    }

    /// `column like pattern`
    #[must_use]
    pub fn like(column: impl Into<ColumnExpr>, pattern: impl ToSqlValue) -> Self {
        Self::Like {
            column: column.into(),
            value: pattern.to_sql_value(),
            case_sensitive: false,
            not: false,
        }
    }

    /// Compares one part of a date-time column.
    #[must_use]
    pub fn date(
        part: DatePart,
        column: impl Into<ColumnExpr>,
        operator: &str,
        value: impl ToSqlValue,
    ) -> Self {
        Self::Date {
            part,
            column: column.into(),
            operator: operator.to_owned(),
            value: value.to_sql_value(),
        }
    }

    /// `first operator second`
    #[must_use]
    pub fn column(
        first: impl Into<ColumnExpr>,
        operator: &str,
        second: impl Into<ColumnExpr>,
    ) -> Self {
        Self::Column {
            first: first.into(),
            operator: operator.to_owned(),
            second: second.into(),
        }
    }

    /// Parenthesized group.
    #[must_use]
    pub const fn nested(wheres: WhereTree) -> Self {
        Self::Nested { wheres }
    }

    /// `exists (query)`
    #[must_use]
    pub fn exists(query: QueryState) -> Self {
        Self::Exists {
            query: Box::new(query),
            not: false,
        }
    }
}

/// A single HAVING predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HavingNode {
    /// Verbatim SQL with its own bindings.
    Raw {
        /// SQL fragment.
        sql: String,
        /// Values bound by the fragment.
        #[serde(default)]
        bindings: Vec<Value>,
    },
    /// `column operator value`
    Basic {
        /// Column.
        column: ColumnExpr,
        /// Comparison operator.
        operator: String,
        /// Compared value.
        value: Value,
    },
    /// `column between min and max`
    Between {
        /// Column.
        column: ColumnExpr,
        /// Lower bound.
        min: Value,
        /// Upper bound.
        max: Value,
        /// Negated.
        #[serde(default)]
        not: bool,
    },
    /// `column is null`
    Null {
        /// Column.
        column: ColumnExpr,
    },
    /// `column is not null`
    NotNull {
        /// Column.
        column: ColumnExpr,
    },
    /// `(column operator value) != 0`
    Bit {
        /// Column.
        column: ColumnExpr,
        /// Bitwise operator.
        operator: String,
        /// Operand.
        value: Value,
    },
    /// A pre-rendered expression without bindings.
    Expression {
        /// SQL fragment.
        sql: String,
    },
    /// Parenthesized group.
    Nested {
        /// Clauses of the group.
        havings: HavingTree,
    },
}

impl HavingNode {
    /// `column operator value`
    #[must_use]
    pub fn basic(column: impl Into<ColumnExpr>, operator: &str, value: impl ToSqlValue) -> Self {
        Self::Basic {
            column: column.into(),
            operator: operator.to_owned(),
            value: value.to_sql_value(),
        }
    }
}
