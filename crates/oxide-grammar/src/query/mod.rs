//! Query state.
//!
//! A [`QueryState`] is the fully assembled description of one statement's
//! target, filters, grouping, ordering, pagination, locking and unions. It is
//! plain data: grammars read it and never mutate it, so the same state can be
//! compiled by several dialects, or by the same dialect repeatedly, with
//! identical results.

mod bindings;
mod clause;
mod record;

use serde::{Deserialize, Serialize};

pub use bindings::{BindingBag, BindingKind};
pub use clause::{
    Boolean, Clause, ClauseTree, DatePart, FullTextOptions, HavingNode, HavingTree, InValues,
    WhereNode, WhereTree,
};
pub use record::{InsertValues, Record, UpsertColumn};

use crate::value::Value;

/// A column reference or a raw expression used where a column is expected.
///
/// Names may be qualified (`users.id`), aliased (`id as user_id`) or JSON
/// selectors (`options->language`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnExpr {
    /// A column name, wrapped by the grammar.
    Name(String),
    /// Verbatim SQL with its own bindings.
    Raw {
        /// SQL fragment.
        sql: String,
        /// Values bound by the fragment.
        #[serde(default)]
        bindings: Vec<Value>,
    },
}

impl ColumnExpr {
    /// Verbatim SQL without bindings.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    /// Bindings carried by a raw expression.
    #[must_use]
    pub fn bindings(&self) -> &[Value] {
        match self {
            Self::Name(_) => &[],
            Self::Raw { bindings, .. } => bindings,
        }
    }
}

impl From<&str> for ColumnExpr {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ColumnExpr {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// The target of FROM, JOIN, INSERT, UPDATE and DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    /// A table name, optionally schema qualified or aliased.
    Name(String),
    /// A derived table: `(select ...) as alias`.
    Sub {
        /// The inner select.
        query: Box<QueryState>,
        /// Alias of the derived table.
        alias: String,
    },
    /// Verbatim SQL with its own bindings.
    Raw {
        /// SQL fragment.
        sql: String,
        /// Values bound by the fragment.
        #[serde(default)]
        bindings: Vec<Value>,
    },
}

impl TableRef {
    /// A derived table.
    #[must_use]
    pub fn sub(query: QueryState, alias: &str) -> Self {
        Self::Sub {
            query: Box::new(query),
            alias: alias.to_owned(),
        }
    }

    /// Returns true for a derived table.
    #[must_use]
    pub const fn is_sub(&self) -> bool {
        matches!(self, Self::Sub { .. })
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

/// DISTINCT flavour of a select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distinct {
    /// No DISTINCT.
    #[default]
    Off,
    /// `select distinct`
    All,
    /// `select distinct on (...)`, PostgreSQL only; elsewhere plain DISTINCT.
    On(Vec<ColumnExpr>),
}

impl Distinct {
    /// Returns true unless DISTINCT is off.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// An aggregate replacing the select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// SQL function name (`count`, `max`, ...).
    pub function: String,
    /// Aggregated columns.
    pub columns: Vec<ColumnExpr>,
}

impl Aggregate {
    /// Creates an aggregate over the given columns.
    #[must_use]
    pub fn new(function: &str, columns: Vec<ColumnExpr>) -> Self {
        Self {
            function: function.to_owned(),
            columns,
        }
    }

    /// `count(*)`
    #[must_use]
    pub fn count() -> Self {
        Self::new("count", vec![ColumnExpr::from("*")])
    }
}

/// Join flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// `inner join`
    #[default]
    Inner,
    /// `left join`
    Left,
    /// `right join`
    Right,
    /// `cross join`
    Cross,
}

impl JoinType {
    /// Keyword placed before `join`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::Left => "left",
            Self::Right => "right",
            Self::Cross => "cross",
        }
    }
}

/// A join and its ON clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Join flavour.
    #[serde(rename = "type", default)]
    pub kind: JoinType,
    /// Joined table.
    pub table: TableRef,
    /// ON clauses, rendered with the `on` conjunction.
    #[serde(default)]
    pub on: WhereTree,
    /// Joins nested inside this one: `join (t inner join u on ...) on ...`.
    #[serde(default)]
    pub joins: Vec<Join>,
    /// Lateral join against a derived table.
    #[serde(default)]
    pub lateral: bool,
}

impl Join {
    /// Creates a join without ON clauses.
    #[must_use]
    pub fn new(kind: JoinType, table: impl Into<TableRef>) -> Self {
        Self {
            kind,
            table: table.into(),
            on: WhereTree::new(),
            joins: Vec::new(),
            lateral: false,
        }
    }

    /// `inner join table`
    #[must_use]
    pub fn inner(table: impl Into<TableRef>) -> Self {
        Self::new(JoinType::Inner, table)
    }

    /// `left join table`
    #[must_use]
    pub fn left(table: impl Into<TableRef>) -> Self {
        Self::new(JoinType::Left, table)
    }

    /// Adds `first operator second` to the ON clauses.
    #[must_use]
    pub fn on(mut self, first: &str, operator: &str, second: &str) -> Self {
        self.on.push(Boolean::And, WhereNode::column(first, operator, second));
        self
    }

    /// Adds `first operator second` to the ON clauses, joined with `or`.
    #[must_use]
    pub fn or_on(mut self, first: &str, operator: &str, second: &str) -> Self {
        self.on.push(Boolean::Or, WhereNode::column(first, operator, second));
        self
    }

    /// Adds an arbitrary clause to the ON tree.
    #[must_use]
    pub fn on_where(mut self, node: WhereNode) -> Self {
        self.on.push(Boolean::And, node);
        self
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Order {
    /// Sort by a column.
    Column {
        /// Column.
        column: ColumnExpr,
        /// Direction.
        #[serde(default)]
        direction: Direction,
    },
    /// Verbatim SQL with its own bindings.
    Raw {
        /// SQL fragment.
        sql: String,
        /// Values bound by the fragment.
        #[serde(default)]
        bindings: Vec<Value>,
    },
    /// Random order.
    Random {
        /// Seed passed to the random function, where supported.
        #[serde(default)]
        seed: Option<String>,
    },
}

impl Order {
    /// Ascending order on a column.
    #[must_use]
    pub fn asc(column: impl Into<ColumnExpr>) -> Self {
        Self::Column {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending order on a column.
    #[must_use]
    pub fn desc(column: impl Into<ColumnExpr>) -> Self {
        Self::Column {
            column: column.into(),
            direction: Direction::Desc,
        }
    }

    /// Verbatim SQL without bindings.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

/// Row locking mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lock {
    /// Shared lock.
    Shared,
    /// Exclusive (update) lock.
    Exclusive,
    /// Verbatim locking clause.
    Raw(String),
}

/// One branch of a UNION.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    /// The branch select.
    pub query: Box<QueryState>,
    /// `union all` instead of `union`.
    #[serde(default)]
    pub all: bool,
}

/// The complete description of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryState {
    /// FROM target.
    pub from: Option<TableRef>,
    /// Select list; `None` selects `*`.
    pub columns: Option<Vec<ColumnExpr>>,
    /// DISTINCT flavour.
    pub distinct: Distinct,
    /// Aggregate replacing the select list.
    pub aggregate: Option<Aggregate>,
    /// Joins in declaration order.
    pub joins: Vec<Join>,
    /// WHERE clauses.
    pub wheres: WhereTree,
    /// GROUP BY columns.
    pub groups: Vec<ColumnExpr>,
    /// HAVING clauses.
    pub havings: HavingTree,
    /// ORDER BY entries.
    pub orders: Vec<Order>,
    /// Row limit.
    pub limit: Option<u64>,
    /// Row offset.
    pub offset: Option<u64>,
    /// Locking mode.
    pub lock: Option<Lock>,
    /// UNION branches.
    pub unions: Vec<Union>,
    /// ORDER BY applied to the union result.
    pub union_orders: Vec<Order>,
    /// Limit applied to the union result.
    pub union_limit: Option<u64>,
    /// Offset applied to the union result.
    pub union_offset: Option<u64>,
}

impl QueryState {
    /// An empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state selecting from `table`.
    #[must_use]
    pub fn table(table: impl Into<TableRef>) -> Self {
        Self {
            from: Some(table.into()),
            ..Self::default()
        }
    }

    /// Replaces the select list.
    #[must_use]
    pub fn select<C: Into<ColumnExpr>>(mut self, columns: Vec<C>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a WHERE clause joined with `and`.
    #[must_use]
    pub fn and_where(mut self, node: WhereNode) -> Self {
        self.wheres.push(Boolean::And, node);
        self
    }

    /// Adds a WHERE clause joined with `or`.
    #[must_use]
    pub fn or_where(mut self, node: WhereNode) -> Self {
        self.wheres.push(Boolean::Or, node);
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds GROUP BY columns.
    #[must_use]
    pub fn group_by<C: Into<ColumnExpr>>(mut self, columns: Vec<C>) -> Self {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a HAVING clause joined with `and`.
    #[must_use]
    pub fn having(mut self, node: HavingNode) -> Self {
        self.havings.push(Boolean::And, node);
        self
    }

    /// Adds an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the lock mode.
    #[must_use]
    pub fn lock(mut self, lock: Lock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Sets the DISTINCT flavour.
    #[must_use]
    pub fn distinct(mut self, distinct: Distinct) -> Self {
        self.distinct = distinct;
        self
    }

    /// Sets the aggregate.
    #[must_use]
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// Adds a UNION branch.
    #[must_use]
    pub fn union(mut self, query: Self, all: bool) -> Self {
        self.unions.push(Union {
            query: Box::new(query),
            all,
        });
        self
    }

    /// Adds an ORDER BY entry to the union result.
    #[must_use]
    pub fn union_order_by(mut self, order: Order) -> Self {
        self.union_orders.push(order);
        self
    }

    /// Returns true when the statement needs joins or a limit expressed
    /// through a row-identifier sub-select on dialects that cannot put them
    /// on UPDATE or DELETE directly.
    #[must_use]
    pub fn has_joins_or_limit(&self) -> bool {
        !self.joins.is_empty() || self.limit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_json() {
        let state: QueryState = serde_json::from_str(
            r#"{
                "from": "users",
                "columns": ["id", {"sql": "count(*) as c"}],
                "wheres": [{"node": {"type": "null", "column": "deleted_at"}}],
                "orders": [{"type": "column", "column": "id", "direction": "desc"}],
                "limit": 10
            }"#,
        )
        .unwrap();
        let expected = QueryState::table("users")
            .select(vec![ColumnExpr::from("id"), ColumnExpr::raw("count(*) as c")])
            .and_where(WhereNode::null("deleted_at"))
            .order_by(Order::desc("id"))
            .limit(10);
        assert_eq!(state, expected);
    }

    #[test]
    fn test_derived_table_from_json() {
        let state: QueryState = serde_json::from_str(
            r#"{"from": {"query": {"from": "posts"}, "alias": "p"}}"#,
        )
        .unwrap();
        assert_eq!(
            state.from,
            Some(TableRef::sub(QueryState::table("posts"), "p"))
        );
    }
}
