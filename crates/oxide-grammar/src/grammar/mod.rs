//! SQL grammars.
//!
//! A grammar turns a [`QueryState`] into SQL text and, separately, into the
//! ordered list of values bound to its placeholders. The base algorithm lives
//! in the default methods of [`Grammar`]; each dialect overrides the handful
//! of methods where its SQL differs.

mod collect;
mod generic;
pub mod json;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;
mod statement;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

pub use generic::GenericGrammar;
pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;
pub use sqlserver::SqlServerGrammar;
pub use statement::{CompiledQuery, Statement};

use crate::config::GrammarConfig;
use crate::error::{GrammarError, Result};
use crate::query::{
    Aggregate, BindingBag, BindingKind, ColumnExpr, DatePart, Distinct, FullTextOptions,
    HavingNode, HavingTree, InValues, InsertValues, Join, Lock, Order, QueryState, Record,
    TableRef, Union, UpsertColumn, WhereNode, WhereTree,
};
use crate::value::Value;

static ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+as\s+").expect("valid alias pattern"));

static LEADING_BOOLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(and|or) ").expect("valid boolean pattern"));

/// A clause of a SELECT statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectComponent {
    /// Aggregate select list.
    Aggregate,
    /// Plain select list.
    Columns,
    /// FROM clause.
    From,
    /// Joins.
    Joins,
    /// WHERE clause.
    Wheres,
    /// GROUP BY clause.
    Groups,
    /// HAVING clause.
    Havings,
    /// ORDER BY clause.
    Orders,
    /// Row limit.
    Limit,
    /// Row offset.
    Offset,
    /// Locking clause.
    Lock,
}

static DEFAULT_COMPONENTS: [SelectComponent; 11] = [
    SelectComponent::Aggregate,
    SelectComponent::Columns,
    SelectComponent::From,
    SelectComponent::Joins,
    SelectComponent::Wheres,
    SelectComponent::Groups,
    SelectComponent::Havings,
    SelectComponent::Orders,
    SelectComponent::Limit,
    SelectComponent::Offset,
    SelectComponent::Lock,
];

/// Splits `name as alias` (case-insensitive, any whitespace).
fn split_alias(value: &str) -> Option<(&str, &str)> {
    let mut parts = ALIAS.splitn(value, 3);
    let name = parts.next()?;
    let alias = parts.next()?;
    Some((name, alias))
}

/// Name a table is referred to by in the rest of the statement.
fn table_alias(table: &TableRef) -> &str {
    match table {
        TableRef::Name(name) => split_alias(name).map_or(name.as_str(), |(_, alias)| alias),
        TableRef::Sub { alias, .. } => alias,
        TableRef::Raw { sql, .. } => split_alias(sql).map_or(sql.as_str(), |(_, alias)| alias),
    }
}

/// Joins the non-empty fragments with single spaces.
fn concatenate<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips the connective of the first clause of a rendered group.
fn remove_leading_boolean(value: &str) -> String {
    LEADING_BOOLEAN.replace(value, "").into_owned()
}

fn missing_table() -> GrammarError {
    GrammarError::malformed("statement requires a table")
}

/// `<identifier> in (select <alias>.<identifier> ...)`, used by dialects
/// that cannot put joins or a limit on UPDATE and DELETE.
fn row_identifier_filter<G: Grammar + ?Sized>(
    grammar: &G,
    query: &QueryState,
    identifier: &str,
) -> Result<String> {
    let table = query.from.as_ref().ok_or_else(missing_table)?;
    let alias = table_alias(table);
    let derived = QueryState {
        columns: Some(vec![ColumnExpr::Name(format!("{alias}.{identifier}"))]),
        aggregate: None,
        ..query.clone()
    };
    Ok(format!(
        "{} in ({})",
        grammar.wrap(identifier)?,
        grammar.compile_select(&derived)?
    ))
}

/// Rejects the clauses an UPDATE or DELETE cannot render: groups, havings,
/// unions, an offset, and a limit unless `limit_allowed`.
fn reject_unrendered_clauses<G: Grammar + ?Sized>(
    grammar: &G,
    query: &QueryState,
    statement: &str,
    limit_allowed: bool,
) -> Result<()> {
    let clause = if !query.groups.is_empty() {
        "group by"
    } else if !query.havings.is_empty() {
        "having"
    } else if !query.unions.is_empty() {
        "union"
    } else if query.offset.unwrap_or(0) > 0 {
        "offset"
    } else if query.limit.is_some() && !limit_allowed {
        "limit"
    } else {
        return Ok(());
    };
    Err(GrammarError::invalid_option(format!(
        "{} {statement} cannot carry a {clause} clause",
        grammar.name()
    )))
}

/// `schema.prefix_table as prefix_alias`, each part quoted.
fn wrap_prefixed_table<G: Grammar + ?Sized>(grammar: &G, table: &str) -> String {
    let prefix = &grammar.config().table_prefix;
    if let Some((name, alias)) = split_alias(table) {
        return format!(
            "{} as {}",
            grammar.wrap_table(name),
            grammar.wrap_value(&format!("{prefix}{alias}"))
        );
    }
    match table.rsplit_once('.') {
        Some((schema, name)) => format!(
            "{}.{}",
            schema
                .split('.')
                .map(|segment| grammar.wrap_value(segment))
                .collect::<Vec<_>>()
                .join("."),
            grammar.wrap_value(&format!("{prefix}{name}"))
        ),
        None => grammar.wrap_value(&format!("{prefix}{table}")),
    }
}

/// A SQL dialect.
///
/// Every method has a working default; together they form the base grammar.
/// Dialects implement [`Grammar::name`] and [`Grammar::config`] and override
/// what their SQL does differently. The trait is object safe, so grammars can
/// be picked at runtime through [`DialectKind::grammar`].
pub trait Grammar: Send + Sync {
    /// Name of the dialect, used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Configuration the grammar was built with.
    fn config(&self) -> &GrammarConfig;

    /// Builds an [`GrammarError::Unsupported`] error for this dialect.
    fn unsupported(&self, feature: &'static str) -> GrammarError {
        GrammarError::unsupported(self.name(), feature)
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Compiles a statement of any kind.
    ///
    /// Returns one query, except for truncation which some dialects express
    /// as several statements.
    fn compile(&self, query: &QueryState, statement: &Statement) -> Result<Vec<CompiledQuery>> {
        let compiled = match statement {
            Statement::Select => self.to_select(query)?,
            Statement::Exists => self.to_exists(query)?,
            Statement::Insert { values } => self.to_insert(query, values)?,
            Statement::InsertOrIgnore { values } => self.to_insert_or_ignore(query, values)?,
            Statement::InsertGetId { values, sequence } => {
                self.to_insert_get_id(query, values, sequence.as_deref())?
            }
            Statement::InsertUsing { columns, query: select } => {
                self.to_insert_using(query, columns, select)?
            }
            Statement::Upsert {
                values,
                unique_by,
                update,
            } => self.to_upsert(query, values, unique_by, update)?,
            Statement::Update { values } => self.to_update(query, values)?,
            Statement::Delete => self.to_delete(query)?,
            Statement::Truncate => return self.to_truncate(query),
        };
        Ok(vec![compiled])
    }

    /// Compiles a SELECT with its bindings.
    fn to_select(&self, query: &QueryState) -> Result<CompiledQuery> {
        let sql = self.compile_select(query)?;
        let bindings = self.prepare_bindings_for_select(&self.collect_bindings(query));
        Ok(CompiledQuery::traced(self.name(), "select", sql, bindings))
    }

    /// Compiles an existence check with its bindings.
    fn to_exists(&self, query: &QueryState) -> Result<CompiledQuery> {
        let sql = self.compile_exists(query)?;
        let bindings = self.prepare_bindings_for_exists(&self.collect_bindings(query));
        Ok(CompiledQuery::traced(self.name(), "exists", sql, bindings))
    }

    /// Compiles an INSERT with its bindings.
    fn to_insert(&self, query: &QueryState, values: &InsertValues) -> Result<CompiledQuery> {
        let sql = self.compile_insert(query, values)?;
        let bindings = self.prepare_bindings_for_insert(values)?;
        Ok(CompiledQuery::traced(self.name(), "insert", sql, bindings))
    }

    /// Compiles an INSERT that skips conflicting rows.
    fn to_insert_or_ignore(
        &self,
        query: &QueryState,
        values: &InsertValues,
    ) -> Result<CompiledQuery> {
        let sql = self.compile_insert_or_ignore(query, values)?;
        let bindings = self.prepare_bindings_for_insert(values)?;
        Ok(CompiledQuery::traced(self.name(), "insert or ignore", sql, bindings))
    }

    /// Compiles an INSERT that reports the generated key.
    fn to_insert_get_id(
        &self,
        query: &QueryState,
        values: &InsertValues,
        sequence: Option<&str>,
    ) -> Result<CompiledQuery> {
        let sql = self.compile_insert_get_id(query, values, sequence)?;
        let bindings = self.prepare_bindings_for_insert(values)?;
        Ok(CompiledQuery::traced(self.name(), "insert get id", sql, bindings))
    }

    /// Compiles an INSERT fed by a SELECT.
    fn to_insert_using(
        &self,
        query: &QueryState,
        columns: &[ColumnExpr],
        select: &QueryState,
    ) -> Result<CompiledQuery> {
        let sql = self.compile_insert_using(query, columns, select)?;
        let bindings = self.prepare_bindings_for_select(&self.collect_bindings(select));
        Ok(CompiledQuery::traced(self.name(), "insert using", sql, bindings))
    }

    /// Compiles an upsert.
    ///
    /// Without update columns this is a plain INSERT.
    fn to_upsert(
        &self,
        query: &QueryState,
        values: &InsertValues,
        unique_by: &[String],
        update: &[UpsertColumn],
    ) -> Result<CompiledQuery> {
        if update.is_empty() {
            return self.to_insert(query, values);
        }
        let sql = self.compile_upsert(query, values, unique_by, update)?;
        let bindings = self.prepare_bindings_for_upsert(values, update)?;
        Ok(CompiledQuery::traced(self.name(), "upsert", sql, bindings))
    }

    /// Compiles an UPDATE with its bindings.
    fn to_update(&self, query: &QueryState, values: &Record) -> Result<CompiledQuery> {
        let sql = self.compile_update(query, values)?;
        let bindings =
            self.prepare_bindings_for_update(query, &self.collect_bindings(query), values);
        Ok(CompiledQuery::traced(self.name(), "update", sql, bindings))
    }

    /// Compiles a DELETE with its bindings.
    fn to_delete(&self, query: &QueryState) -> Result<CompiledQuery> {
        let sql = self.compile_delete(query)?;
        let bindings = self.prepare_bindings_for_delete(query, &self.collect_bindings(query));
        Ok(CompiledQuery::traced(self.name(), "delete", sql, bindings))
    }

    /// Compiles the statements emptying a table.
    fn to_truncate(&self, query: &QueryState) -> Result<Vec<CompiledQuery>> {
        Ok(self
            .compile_truncate(query)?
            .into_iter()
            .map(|(sql, bindings)| CompiledQuery::traced(self.name(), "truncate", sql, bindings))
            .collect())
    }

    // ------------------------------------------------------------------
    // SELECT
    // ------------------------------------------------------------------

    /// Order in which SELECT components are rendered.
    fn select_components(&self) -> &'static [SelectComponent] {
        &DEFAULT_COMPONENTS
    }

    /// Compiles a SELECT statement.
    fn compile_select(&self, query: &QueryState) -> Result<String> {
        match &query.aggregate {
            Some(aggregate) if !query.unions.is_empty() || !query.havings.is_empty() => {
                self.compile_union_aggregate(query, aggregate)
            }
            aggregate => self.compile_select_body(query, aggregate.as_ref()),
        }
    }

    /// Compiles a SELECT with an explicit aggregate, bypassing the union
    /// aggregate path.
    fn compile_select_body(
        &self,
        query: &QueryState,
        aggregate: Option<&Aggregate>,
    ) -> Result<String> {
        self.assemble_select(query, aggregate)
    }

    /// Renders the components of a SELECT followed by its unions.
    fn assemble_select(&self, query: &QueryState, aggregate: Option<&Aggregate>) -> Result<String> {
        let components = self.compile_components(query, aggregate)?;
        let sql = concatenate(components.into_iter().map(|(_, sql)| sql));
        if query.unions.is_empty() {
            return Ok(sql);
        }
        Ok(format!("{} {}", self.wrap_union(&sql), self.compile_unions(query)?))
    }

    /// Aggregates over the rows of a union (or a grouped select with
    /// havings) by selecting from it as a derived table.
    fn compile_union_aggregate(&self, query: &QueryState, aggregate: &Aggregate) -> Result<String> {
        let sql = self.compile_aggregate(query, aggregate)?;
        Ok(format!(
            "{sql} from ({}) as {}",
            self.compile_select_body(query, None)?,
            self.wrap_table("temp_table")
        ))
    }

    /// Renders every non-empty component, tagged with its kind.
    fn compile_components(
        &self,
        query: &QueryState,
        aggregate: Option<&Aggregate>,
    ) -> Result<Vec<(SelectComponent, String)>> {
        let all_columns = [ColumnExpr::from("*")];
        let mut parts = Vec::new();
        for component in self.select_components() {
            let sql = match component {
                SelectComponent::Aggregate => match aggregate {
                    Some(aggregate) => self.compile_aggregate(query, aggregate)?,
                    None => continue,
                },
                SelectComponent::Columns => {
                    if aggregate.is_some() {
                        continue;
                    }
                    let columns = query.columns.as_deref().unwrap_or(&all_columns);
                    self.compile_columns(query, columns)?
                }
                SelectComponent::From => match &query.from {
                    Some(table) => self.compile_from(query, table)?,
                    None => continue,
                },
                SelectComponent::Joins => self.compile_joins(query, &query.joins)?,
                SelectComponent::Wheres => self.compile_wheres(query)?,
                SelectComponent::Groups => self.compile_groups(&query.groups)?,
                SelectComponent::Havings => self.compile_havings(&query.havings)?,
                SelectComponent::Orders => self.compile_orders(&query.orders)?,
                SelectComponent::Limit => match query.limit {
                    Some(limit) => self.compile_limit(limit, query.offset),
                    None => continue,
                },
                SelectComponent::Offset => match query.offset {
                    Some(offset) => self.compile_offset(offset),
                    None => continue,
                },
                SelectComponent::Lock => match &query.lock {
                    Some(lock) => self.compile_lock(query, lock),
                    None => continue,
                },
            };
            if !sql.is_empty() {
                parts.push((*component, sql));
            }
        }
        Ok(parts)
    }

    /// `select fn(columns) as aggregate`
    fn compile_aggregate(&self, query: &QueryState, aggregate: &Aggregate) -> Result<String> {
        let mut column = self.columnize(&aggregate.columns)?;
        match &query.distinct {
            Distinct::On(columns) => column = format!("distinct {}", self.columnize(columns)?),
            Distinct::All if column != "*" => column = format!("distinct {column}"),
            _ => {}
        }
        Ok(format!("select {}({column}) as aggregate", aggregate.function))
    }

    /// `select [distinct] columns`
    fn compile_columns(&self, query: &QueryState, columns: &[ColumnExpr]) -> Result<String> {
        let select = if query.distinct.is_enabled() {
            "select distinct "
        } else {
            "select "
        };
        Ok(format!("{select}{}", self.columnize(columns)?))
    }

    /// `from table`
    fn compile_from(&self, _query: &QueryState, table: &TableRef) -> Result<String> {
        Ok(format!("from {}", self.compile_table_ref(table)?))
    }

    /// Renders a table reference: a wrapped name, a raw fragment or a
    /// derived table.
    fn compile_table_ref(&self, table: &TableRef) -> Result<String> {
        match table {
            TableRef::Name(name) => Ok(self.wrap_table(name)),
            TableRef::Raw { sql, .. } => Ok(sql.clone()),
            TableRef::Sub { query, alias } => Ok(format!(
                "({}) as {}",
                self.compile_select(query)?,
                self.wrap_table(alias)
            )),
        }
    }

    /// Table of an INSERT, UPDATE, DELETE or TRUNCATE.
    fn compile_write_table(&self, query: &QueryState) -> Result<String> {
        let table = query.from.as_ref().ok_or_else(missing_table)?;
        self.compile_table_ref(table)
    }

    /// Renders the joins, nested joins in parentheses.
    fn compile_joins(&self, query: &QueryState, joins: &[Join]) -> Result<String> {
        let mut parts = Vec::with_capacity(joins.len());
        for join in joins {
            let table = self.compile_table_ref(&join.table)?;
            let table_and_nested = if join.joins.is_empty() {
                table
            } else {
                format!("({table} {})", self.compile_joins(query, &join.joins)?)
            };
            if join.lateral {
                if !join.table.is_sub() {
                    return Err(GrammarError::invalid_option(
                        "lateral joins require a sub-select target",
                    ));
                }
                if !join.on.is_empty() {
                    return Err(GrammarError::invalid_option(
                        "lateral joins take no on clause",
                    ));
                }
                parts.push(self.compile_join_lateral(join, &table_and_nested)?);
                continue;
            }
            let on = self.compile_where_tree(&join.on, "on")?;
            parts.push(concatenate([
                format!("{} join", join.kind.as_str()),
                table_and_nested,
                on,
            ]));
        }
        Ok(parts.join(" "))
    }

    /// Renders a lateral join against a derived table.
    fn compile_join_lateral(&self, _join: &Join, _expression: &str) -> Result<String> {
        Err(self.unsupported("lateral joins"))
    }

    /// `group by columns`
    fn compile_groups(&self, groups: &[ColumnExpr]) -> Result<String> {
        if groups.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("group by {}", self.columnize(groups)?))
    }

    /// `order by entries`
    fn compile_orders(&self, orders: &[Order]) -> Result<String> {
        if orders.is_empty() {
            return Ok(String::new());
        }
        let entries = orders
            .iter()
            .map(|order| self.compile_order(order))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("order by {}", entries.join(", ")))
    }

    /// One ORDER BY entry.
    fn compile_order(&self, order: &Order) -> Result<String> {
        match order {
            Order::Column { column, direction } => Ok(format!(
                "{} {}",
                self.wrap_column(column)?,
                direction.as_str()
            )),
            Order::Raw { sql, .. } => Ok(sql.clone()),
            Order::Random { seed } => Ok(self.compile_random(seed.as_deref())),
        }
    }

    /// Random ordering function.
    fn compile_random(&self, _seed: Option<&str>) -> String {
        String::from("RANDOM()")
    }

    /// `limit n`
    fn compile_limit(&self, limit: u64, _offset: Option<u64>) -> String {
        format!("limit {limit}")
    }

    /// `offset n`
    fn compile_offset(&self, offset: u64) -> String {
        format!("offset {offset}")
    }

    /// Trailing locking clause. Only verbatim lock strings render in the
    /// base grammar.
    fn compile_lock(&self, _query: &QueryState, lock: &Lock) -> String {
        match lock {
            Lock::Raw(sql) => sql.clone(),
            Lock::Shared | Lock::Exclusive => String::new(),
        }
    }

    /// Union branches followed by the union's own order, limit and offset.
    fn compile_unions(&self, query: &QueryState) -> Result<String> {
        let mut sql = String::new();
        for union in &query.unions {
            sql.push_str(&self.compile_union(union)?);
        }
        for component in self.select_components() {
            let part = match component {
                SelectComponent::Orders => self.compile_orders(&query.union_orders)?,
                SelectComponent::Limit => query
                    .union_limit
                    .map(|limit| self.compile_limit(limit, query.union_offset))
                    .unwrap_or_default(),
                SelectComponent::Offset => query
                    .union_offset
                    .map(|offset| self.compile_offset(offset))
                    .unwrap_or_default(),
                _ => continue,
            };
            if !part.is_empty() {
                sql.push(' ');
                sql.push_str(&part);
            }
        }
        Ok(sql.trim_start().to_owned())
    }

    /// ` union (select ...)`
    fn compile_union(&self, union: &Union) -> Result<String> {
        let conjunction = if union.all { " union all " } else { " union " };
        Ok(format!(
            "{conjunction}{}",
            self.wrap_union(&self.compile_select(&union.query)?)
        ))
    }

    /// Wraps one side of a union.
    fn wrap_union(&self, sql: &str) -> String {
        format!("({sql})")
    }

    /// `select exists(select ...) as "exists"`
    fn compile_exists(&self, query: &QueryState) -> Result<String> {
        Ok(format!(
            "select exists({}) as {}",
            self.compile_select(query)?,
            self.wrap("exists")?
        ))
    }

    // ------------------------------------------------------------------
    // WHERE
    // ------------------------------------------------------------------

    /// The WHERE clause of a statement.
    fn compile_wheres(&self, query: &QueryState) -> Result<String> {
        self.compile_where_tree(&query.wheres, "where")
    }

    /// `conjunction clauses`, or nothing for an empty tree.
    fn compile_where_tree(&self, wheres: &WhereTree, conjunction: &str) -> Result<String> {
        if wheres.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "{conjunction} {}",
            self.compile_where_body(wheres, conjunction)?
        ))
    }

    /// The clauses of a tree with the leading connective stripped.
    fn compile_where_body(&self, wheres: &WhereTree, conjunction: &str) -> Result<String> {
        let mut parts = Vec::with_capacity(wheres.len());
        for clause in wheres {
            parts.push(format!(
                "{} {}",
                clause.boolean.as_str(),
                self.compile_where(&clause.node, conjunction)?
            ));
        }
        Ok(remove_leading_boolean(&parts.join(" ")))
    }

    /// Renders one predicate.
    fn compile_where(&self, node: &WhereNode, conjunction: &str) -> Result<String> {
        match node {
            WhereNode::Raw { sql, .. } => Ok(sql.clone()),
            WhereNode::Basic {
                column,
                operator,
                value,
            } => self.where_basic(column, operator, value),
            WhereNode::Bitwise {
                column,
                operator,
                value,
            } => self.where_bitwise(column, operator, value),
            WhereNode::JsonBoolean {
                column,
                operator,
                value,
            } => self.where_json_boolean(column, operator, *value),
            WhereNode::Like {
                column,
                value,
                case_sensitive,
                not,
            } => self.where_like(column, value, *case_sensitive, *not),
            WhereNode::Between {
                column,
                min,
                max,
                not,
            } => self.where_between(column, min, max, *not),
            WhereNode::BetweenColumns {
                column,
                min,
                max,
                not,
            } => self.where_between_columns(column, min, max, *not),
            WhereNode::In {
                column,
                values: InValues::List(values),
                not,
            } => self.where_in(column, values, *not),
            WhereNode::In {
                column,
                values: InValues::Query(select),
                not,
            } => self.where_in_sub(column, select, *not),
            WhereNode::InRaw { column, values, not } => self.where_in_raw(column, values, *not),
            WhereNode::Null { column } => self.where_null(column),
            WhereNode::NotNull { column } => self.where_not_null(column),
            WhereNode::Date {
                part,
                column,
                operator,
                value,
            } => self.where_date(*part, column, operator, value),
            WhereNode::Nested { wheres } => self.where_nested(wheres, conjunction),
            WhereNode::Exists { query, not } => self.where_exists(query, *not),
            WhereNode::Sub {
                column,
                operator,
                query,
            } => self.where_sub(column, operator, query),
            WhereNode::Column {
                first,
                operator,
                second,
            } => self.where_column(first, operator, second),
            WhereNode::RowValues {
                columns,
                operator,
                values,
            } => self.where_row_values(columns, operator, values),
            WhereNode::JsonContains { column, value, not } => {
                self.where_json_contains(column, value, *not)
            }
            WhereNode::JsonContainsKey { column, not } => {
                self.where_json_contains_key(column, *not)
            }
            WhereNode::JsonLength {
                column,
                operator,
                value,
            } => self.where_json_length(column, operator, value),
            WhereNode::FullText {
                columns,
                value,
                options,
            } => self.where_full_text(columns, value, options),
        }
    }

    /// `lhs operator rhs`, with `?` inside the operator escaped.
    fn compile_comparison(&self, lhs: &str, operator: &str, rhs: &str) -> String {
        format!("{lhs} {} {rhs}", operator.replace('?', "??"))
    }

    /// `column operator ?`
    fn where_basic(&self, column: &ColumnExpr, operator: &str, value: &Value) -> Result<String> {
        Ok(self.compile_comparison(&self.wrap_column(column)?, operator, &self.parameter(value)))
    }

    /// Bitwise comparison; rendered like a basic comparison.
    fn where_bitwise(&self, column: &ColumnExpr, operator: &str, value: &Value) -> Result<String> {
        self.where_basic(column, operator, value)
    }

    /// JSON path compared against a boolean literal.
    fn where_json_boolean(&self, column: &str, operator: &str, value: bool) -> Result<String> {
        let literal = if value { "true" } else { "false" };
        Ok(format!(
            "{} {operator} {}",
            self.wrap_json_boolean_selector(column)?,
            self.wrap_json_boolean_value(literal)
        ))
    }

    /// `like` / `not like`. The base grammar has no case-sensitive form.
    fn where_like(
        &self,
        column: &ColumnExpr,
        value: &Value,
        case_sensitive: bool,
        not: bool,
    ) -> Result<String> {
        if case_sensitive {
            return Err(self.unsupported("case-sensitive like"));
        }
        let operator = if not { "not like" } else { "like" };
        self.where_basic(column, operator, value)
    }

    /// `column [not] between ? and ?`
    fn where_between(
        &self,
        column: &ColumnExpr,
        min: &Value,
        max: &Value,
        not: bool,
    ) -> Result<String> {
        let between = if not { "not between" } else { "between" };
        Ok(format!(
            "{} {between} {} and {}",
            self.wrap_column(column)?,
            self.parameter(min),
            self.parameter(max)
        ))
    }

    /// `column [not] between min_column and max_column`
    fn where_between_columns(
        &self,
        column: &ColumnExpr,
        min: &ColumnExpr,
        max: &ColumnExpr,
        not: bool,
    ) -> Result<String> {
        let between = if not { "not between" } else { "between" };
        Ok(format!(
            "{} {between} {} and {}",
            self.wrap_column(column)?,
            self.wrap_column(min)?,
            self.wrap_column(max)?
        ))
    }

    /// `column [not] in (?, ...)`; an empty list is always false (or always
    /// true when negated).
    fn where_in(&self, column: &ColumnExpr, values: &[Value], not: bool) -> Result<String> {
        if values.is_empty() {
            return Ok(String::from(if not { "1 = 1" } else { "0 = 1" }));
        }
        let operator = if not { "not in" } else { "in" };
        Ok(format!(
            "{} {operator} ({})",
            self.wrap_column(column)?,
            self.parameterize(values)
        ))
    }

    /// `column [not] in (select ...)`
    fn where_in_sub(&self, column: &ColumnExpr, select: &QueryState, not: bool) -> Result<String> {
        let operator = if not { "not in" } else { "in" };
        Ok(format!(
            "{} {operator} ({})",
            self.wrap_column(column)?,
            self.compile_select(select)?
        ))
    }

    /// `column [not] in (1, 2, 3)` with the integers inlined.
    fn where_in_raw(&self, column: &ColumnExpr, values: &[i64], not: bool) -> Result<String> {
        if values.is_empty() {
            return Ok(String::from(if not { "1 = 1" } else { "0 = 1" }));
        }
        let operator = if not { "not in" } else { "in" };
        let list = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{} {operator} ({list})", self.wrap_column(column)?))
    }

    /// `column is null`
    fn where_null(&self, column: &ColumnExpr) -> Result<String> {
        Ok(format!("{} is null", self.wrap_column(column)?))
    }

    /// `column is not null`
    fn where_not_null(&self, column: &ColumnExpr) -> Result<String> {
        Ok(format!("{} is not null", self.wrap_column(column)?))
    }

    /// Compares one part of a date-time column.
    fn where_date(
        &self,
        part: DatePart,
        column: &ColumnExpr,
        operator: &str,
        value: &Value,
    ) -> Result<String> {
        self.date_based_where(part.as_str(), column, operator, value)
    }

    /// `function(column) operator ?`
    fn date_based_where(
        &self,
        function: &str,
        column: &ColumnExpr,
        operator: &str,
        value: &Value,
    ) -> Result<String> {
        Ok(format!(
            "{function}({}) {operator} {}",
            self.wrap_column(column)?,
            self.parameter(value)
        ))
    }

    /// A parenthesized group, rendered with the enclosing conjunction and
    /// stripped of it.
    fn where_nested(&self, wheres: &WhereTree, conjunction: &str) -> Result<String> {
        if wheres.is_empty() {
            return Err(GrammarError::malformed("nested where group is empty"));
        }
        Ok(format!("({})", self.compile_where_body(wheres, conjunction)?))
    }

    /// `[not ]exists (select ...)`
    fn where_exists(&self, query: &QueryState, not: bool) -> Result<String> {
        let not = if not { "not " } else { "" };
        Ok(format!("{not}exists ({})", self.compile_select(query)?))
    }

    /// `column operator (select ...)`
    fn where_sub(&self, column: &ColumnExpr, operator: &str, query: &QueryState) -> Result<String> {
        Ok(format!(
            "{} {operator} ({})",
            self.wrap_column(column)?,
            self.compile_select(query)?
        ))
    }

    /// `first operator second`
    fn where_column(&self, first: &ColumnExpr, operator: &str, second: &ColumnExpr) -> Result<String> {
        Ok(format!(
            "{} {operator} {}",
            self.wrap_column(first)?,
            self.wrap_column(second)?
        ))
    }

    /// `(a, b) operator (?, ?)`
    fn where_row_values(
        &self,
        columns: &[ColumnExpr],
        operator: &str,
        values: &[Value],
    ) -> Result<String> {
        if columns.len() != values.len() {
            return Err(GrammarError::malformed(format!(
                "row value comparison has {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(format!(
            "({}) {operator} ({})",
            self.columnize(columns)?,
            self.parameterize(values)
        ))
    }

    /// `[not ]<json contains>`
    fn where_json_contains(&self, column: &str, value: &Value, not: bool) -> Result<String> {
        let not = if not { "not " } else { "" };
        Ok(format!(
            "{not}{}",
            self.compile_json_contains(column, &self.parameter(value))?
        ))
    }

    /// Dialect JSON containment expression.
    fn compile_json_contains(&self, _column: &str, _value: &str) -> Result<String> {
        Err(self.unsupported("JSON contains"))
    }

    /// `[not ]<json contains key>`
    fn where_json_contains_key(&self, column: &str, not: bool) -> Result<String> {
        let not = if not { "not " } else { "" };
        Ok(format!("{not}{}", self.compile_json_contains_key(column)?))
    }

    /// Dialect JSON key existence expression.
    fn compile_json_contains_key(&self, _column: &str) -> Result<String> {
        Err(self.unsupported("JSON contains key"))
    }

    fn where_json_length(&self, column: &str, operator: &str, value: &Value) -> Result<String> {
        self.compile_json_length(column, operator, &self.parameter(value))
    }

    /// Dialect JSON array length comparison.
    fn compile_json_length(&self, _column: &str, _operator: &str, _value: &str) -> Result<String> {
        Err(self.unsupported("JSON length"))
    }

    /// Dialect full-text predicate.
    fn where_full_text(
        &self,
        _columns: &[ColumnExpr],
        _value: &Value,
        _options: &FullTextOptions,
    ) -> Result<String> {
        Err(self.unsupported("full-text search"))
    }

    // ------------------------------------------------------------------
    // HAVING
    // ------------------------------------------------------------------

    /// `having clauses`, or nothing for an empty tree.
    fn compile_havings(&self, havings: &HavingTree) -> Result<String> {
        if havings.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("having {}", self.compile_having_body(havings)?))
    }

    /// The clauses of a having tree with the leading connective stripped.
    fn compile_having_body(&self, havings: &HavingTree) -> Result<String> {
        let mut parts = Vec::with_capacity(havings.len());
        for clause in havings {
            parts.push(format!(
                "{} {}",
                clause.boolean.as_str(),
                self.compile_having(&clause.node)?
            ));
        }
        Ok(remove_leading_boolean(&parts.join(" ")))
    }

    /// Renders one HAVING predicate.
    fn compile_having(&self, node: &HavingNode) -> Result<String> {
        match node {
            HavingNode::Raw { sql, .. } | HavingNode::Expression { sql } => Ok(sql.clone()),
            HavingNode::Basic {
                column,
                operator,
                value,
            } => Ok(format!(
                "{} {operator} {}",
                self.wrap_column(column)?,
                self.parameter(value)
            )),
            HavingNode::Between {
                column,
                min,
                max,
                not,
            } => self.where_between(column, min, max, *not),
            HavingNode::Null { column } => self.where_null(column),
            HavingNode::NotNull { column } => self.where_not_null(column),
            HavingNode::Bit {
                column,
                operator,
                value,
            } => Ok(format!(
                "({} {operator} {}) != 0",
                self.wrap_column(column)?,
                self.parameter(value)
            )),
            HavingNode::Nested { havings } => {
                if havings.is_empty() {
                    return Err(GrammarError::malformed("nested having group is empty"));
                }
                Ok(format!("({})", self.compile_having_body(havings)?))
            }
        }
    }

    // ------------------------------------------------------------------
    // INSERT / UPDATE / DELETE
    // ------------------------------------------------------------------

    /// `insert into t (columns) values (?, ...), ...`
    fn compile_insert(&self, query: &QueryState, values: &InsertValues) -> Result<String> {
        let table = self.compile_write_table(query)?;
        if values.is_empty() {
            return Ok(format!("insert into {table} default values"));
        }
        self.compile_insert_rows(&table, values)
    }

    /// Renders the column list and row tuples of an INSERT.
    fn compile_insert_rows(&self, table: &str, values: &InsertValues) -> Result<String> {
        let columns = values.columns()?;
        let wrapped = columns
            .iter()
            .map(|column| self.wrap(column))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let rows = values
            .records()
            .iter()
            .map(|record| {
                let parameters = columns
                    .iter()
                    .filter_map(|column| record.get(column))
                    .map(|value| self.parameter(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({parameters})")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("insert into {table} ({wrapped}) values {rows}"))
    }

    /// INSERT skipping rows that violate a unique constraint.
    fn compile_insert_or_ignore(&self, _query: &QueryState, _values: &InsertValues) -> Result<String> {
        Err(self.unsupported("insert or ignore"))
    }

    /// INSERT reporting the generated key.
    fn compile_insert_get_id(
        &self,
        query: &QueryState,
        values: &InsertValues,
        _sequence: Option<&str>,
    ) -> Result<String> {
        self.compile_insert(query, values)
    }

    /// `insert into t (columns) select ...`
    fn compile_insert_using(
        &self,
        query: &QueryState,
        columns: &[ColumnExpr],
        select: &QueryState,
    ) -> Result<String> {
        let table = self.compile_write_table(query)?;
        let select = self.compile_select(select)?;
        if columns.is_empty() {
            return Ok(format!("insert into {table} {select}"));
        }
        Ok(format!(
            "insert into {table} ({}) {select}",
            self.columnize(columns)?
        ))
    }

    /// INSERT updating rows that already exist.
    fn compile_upsert(
        &self,
        _query: &QueryState,
        _values: &InsertValues,
        _unique_by: &[String],
        _update: &[UpsertColumn],
    ) -> Result<String> {
        Err(self.unsupported("upsert"))
    }

    /// `update t [joins] set ... [where]`
    fn compile_update(&self, query: &QueryState, values: &Record) -> Result<String> {
        if values.is_empty() {
            return Err(GrammarError::malformed("update requires at least one column"));
        }
        self.validate_write(query, "update")?;
        let table = self.compile_write_table(query)?;
        let columns = self.compile_update_columns(query, values)?;
        let wheres = self.compile_wheres(query)?;
        let sql = if query.joins.is_empty() {
            self.compile_update_without_joins(query, &table, &columns, &wheres)?
        } else {
            self.compile_update_with_joins(query, &table, &columns, &wheres)?
        };
        Ok(sql.trim().to_owned())
    }

    /// Fails when the query carries a clause the UPDATE or DELETE of this
    /// dialect would drop. The base grammar renders neither limit nor offset.
    fn validate_write(&self, query: &QueryState, statement: &str) -> Result<()> {
        reject_unrendered_clauses(self, query, statement, false)
    }

    /// `a = ?, b = ?`
    fn compile_update_columns(&self, _query: &QueryState, values: &Record) -> Result<String> {
        Ok(values
            .iter()
            .map(|(column, value)| Ok(format!("{} = {}", self.wrap(column)?, self.parameter(value))))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn compile_update_without_joins(
        &self,
        _query: &QueryState,
        table: &str,
        columns: &str,
        wheres: &str,
    ) -> Result<String> {
        Ok(concatenate([
            format!("update {table} set {columns}"),
            wheres.to_owned(),
        ]))
    }

    fn compile_update_with_joins(
        &self,
        query: &QueryState,
        table: &str,
        columns: &str,
        wheres: &str,
    ) -> Result<String> {
        let joins = self.compile_joins(query, &query.joins)?;
        Ok(concatenate([
            format!("update {table} {joins} set {columns}"),
            wheres.to_owned(),
        ]))
    }

    /// `delete from t [where]`, or the multi-table form with joins.
    fn compile_delete(&self, query: &QueryState) -> Result<String> {
        self.validate_write(query, "delete")?;
        let table = self.compile_write_table(query)?;
        let wheres = self.compile_wheres(query)?;
        let sql = if query.joins.is_empty() {
            self.compile_delete_without_joins(query, &table, &wheres)?
        } else {
            self.compile_delete_with_joins(query, &table, &wheres)?
        };
        Ok(sql.trim().to_owned())
    }

    fn compile_delete_without_joins(
        &self,
        _query: &QueryState,
        table: &str,
        wheres: &str,
    ) -> Result<String> {
        Ok(concatenate([format!("delete from {table}"), wheres.to_owned()]))
    }

    fn compile_delete_with_joins(
        &self,
        query: &QueryState,
        table: &str,
        wheres: &str,
    ) -> Result<String> {
        let alias = table.rsplit(" as ").next().unwrap_or(table);
        let joins = self.compile_joins(query, &query.joins)?;
        Ok(concatenate([
            format!("delete {alias} from {table} {joins}"),
            wheres.to_owned(),
        ]))
    }

    /// Statements emptying the table, each with its own bindings.
    fn compile_truncate(&self, query: &QueryState) -> Result<Vec<(String, Vec<Value>)>> {
        Ok(vec![(
            format!("truncate table {}", self.compile_write_table(query)?),
            Vec::new(),
        )])
    }

    // ------------------------------------------------------------------
    // Transactions and formats
    // ------------------------------------------------------------------

    /// Whether the dialect has savepoints.
    fn supports_savepoints(&self) -> bool {
        true
    }

    /// Creates a savepoint.
    fn compile_savepoint(&self, name: &str) -> Result<String> {
        if !self.supports_savepoints() {
            return Err(self.unsupported("savepoints"));
        }
        Ok(format!("SAVEPOINT {name}"))
    }

    /// Rolls back to a savepoint.
    fn compile_savepoint_rollback(&self, name: &str) -> Result<String> {
        if !self.supports_savepoints() {
            return Err(self.unsupported("savepoints"));
        }
        Ok(format!("ROLLBACK TO SAVEPOINT {name}"))
    }

    /// `chrono` format of date-time values stored by this dialect.
    fn date_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    /// Formats a date-time for binding.
    fn format_datetime(&self, value: &chrono::NaiveDateTime) -> Value {
        Value::Text(value.format(self.date_format()).to_string())
    }

    /// Inlines bindings into SQL for display purposes.
    ///
    /// Placeholders inside string literals, escaped quotes and the `??`
    /// operator escape are left alone. Never execute the result.
    fn substitute_bindings_into_raw_sql(&self, sql: &str, bindings: &[Value]) -> String {
        let mut bindings = bindings.iter();
        let mut out = String::with_capacity(sql.len());
        let mut in_literal = false;
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            let next = chars.peek().copied();
            match (c, next) {
                ('\\', Some('\'')) | ('\'', Some('\'')) | ('?', Some('?')) => {
                    out.push(c);
                    out.push(chars.next().unwrap_or_default());
                }
                ('\'', _) => {
                    in_literal = !in_literal;
                    out.push(c);
                }
                ('?', _) if !in_literal => match bindings.next() {
                    Some(value) => out.push_str(&value.to_sql_inline()),
                    None => out.push('?'),
                },
                _ => out.push(c),
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Wrapping
    // ------------------------------------------------------------------

    /// Quotes a column reference: aliases, qualified names and JSON
    /// selectors included.
    fn wrap(&self, value: &str) -> Result<String> {
        if let Some((name, alias)) = split_alias(value) {
            return Ok(format!("{} as {}", self.wrap(name)?, self.wrap_value(alias)));
        }
        if json::is_selector(value) {
            return self.wrap_json_selector(value);
        }
        Ok(self.wrap_segments(value))
    }

    /// Quotes a column expression; raw fragments pass through.
    fn wrap_column(&self, column: &ColumnExpr) -> Result<String> {
        match column {
            ColumnExpr::Name(name) => self.wrap(name),
            ColumnExpr::Raw { sql, .. } => Ok(sql.clone()),
        }
    }

    /// Quotes each dot-separated segment; the first of several is a table.
    fn wrap_segments(&self, value: &str) -> String {
        let count = value.split('.').count();
        value
            .split('.')
            .enumerate()
            .map(|(i, segment)| {
                if i == 0 && count > 1 {
                    self.wrap_table(segment)
                } else {
                    self.wrap_value(segment)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a single identifier. `*` is left alone.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_owned();
        }
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    /// Quotes a table name, applying the table prefix to the table and its
    /// alias.
    fn wrap_table(&self, table: &str) -> String {
        wrap_prefixed_table(self, table)
    }

    /// Comma-separated wrapped columns.
    fn columnize(&self, columns: &[ColumnExpr]) -> Result<String> {
        Ok(columns
            .iter()
            .map(|column| self.wrap_column(column))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    /// Comma-separated placeholders.
    fn parameterize(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|value| self.parameter(value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `?`, or the SQL of a raw expression.
    fn parameter(&self, value: &Value) -> String {
        value
            .as_raw()
            .map_or_else(|| String::from("?"), ToOwned::to_owned)
    }

    /// Renders a JSON selector.
    fn wrap_json_selector(&self, _value: &str) -> Result<String> {
        Err(self.unsupported("JSON operations"))
    }

    /// Splits a selector into the wrapped column and `, '<path>'`.
    fn wrap_json_field_and_path(&self, column: &str) -> Result<(String, String)> {
        let (field, path) = json::split_selector(column);
        let path = if path.is_empty() {
            String::new()
        } else {
            format!(", {}", json::wrap_path(path, "->"))
        };
        Ok((self.wrap(field)?, path))
    }

    /// Selector used when comparing a JSON path with a boolean.
    fn wrap_json_boolean_selector(&self, value: &str) -> Result<String> {
        self.wrap_json_selector(value)
    }

    /// Boolean literal compared with a JSON path.
    fn wrap_json_boolean_value(&self, value: &str) -> String {
        value.to_owned()
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    /// Gathers the bindings of a query into buckets.
    fn collect_bindings(&self, query: &QueryState) -> BindingBag {
        collect::bindings(self, query)
    }

    /// Binding of a LIKE pattern.
    fn prepare_where_like_binding(&self, value: &Value, _case_sensitive: bool) -> Value {
        value.clone()
    }

    /// Binding of a JSON containment value: its JSON encoding.
    fn prepare_binding_for_json_contains(&self, value: &Value) -> Value {
        value.to_json_text()
    }

    /// Every bucket, in select order.
    fn prepare_bindings_for_select(&self, bindings: &BindingBag) -> Vec<Value> {
        bindings.flatten()
    }

    /// Bindings of [`Grammar::compile_exists`].
    fn prepare_bindings_for_exists(&self, bindings: &BindingBag) -> Vec<Value> {
        self.prepare_bindings_for_select(bindings)
    }

    /// Row values in rendered column order.
    fn prepare_bindings_for_insert(&self, values: &InsertValues) -> Result<Vec<Value>> {
        let columns = values.columns()?;
        Ok(values
            .values_in(&columns)
            .filter(|value| !value.is_raw())
            .cloned()
            .collect())
    }

    /// Row values followed by explicit update values.
    fn prepare_bindings_for_upsert(
        &self,
        values: &InsertValues,
        update: &[UpsertColumn],
    ) -> Result<Vec<Value>> {
        let mut bindings = self.prepare_bindings_for_insert(values)?;
        bindings.extend(update.iter().filter_map(|column| match column {
            UpsertColumn::Value(_, value) if !value.is_raw() => Some(value.clone()),
            _ => None,
        }));
        Ok(bindings)
    }

    /// Table and join bindings, SET values, then the WHERE clause; the
    /// layout of `update t join ... set ... where ...`.
    fn prepare_bindings_for_update(
        &self,
        _query: &QueryState,
        bindings: &BindingBag,
        values: &Record,
    ) -> Vec<Value> {
        bindings.for_update(
            &[BindingKind::From, BindingKind::Join],
            values.iter().map(|(_, value)| value.clone()).collect(),
            &[BindingKind::Where],
        )
    }

    /// Table, join and WHERE bindings.
    fn prepare_bindings_for_delete(&self, _query: &QueryState, bindings: &BindingBag) -> Vec<Value> {
        bindings.flatten_only(&[BindingKind::From, BindingKind::Join, BindingKind::Where])
    }
}

/// Dialects available at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// ANSI-leaning base grammar.
    Generic,
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

impl DialectKind {
    /// Every dialect.
    pub const ALL: [Self; 5] = [
        Self::Generic,
        Self::MySql,
        Self::Postgres,
        Self::Sqlite,
        Self::SqlServer,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Builds the grammar of this dialect.
    #[must_use]
    pub fn grammar(self, config: GrammarConfig) -> Box<dyn Grammar> {
        match self {
            Self::Generic => Box::new(GenericGrammar::with_config(config)),
            Self::MySql => Box::new(MySqlGrammar::with_config(config)),
            Self::Postgres => Box::new(PostgresGrammar::with_config(config)),
            Self::Sqlite => Box::new(SqliteGrammar::with_config(config)),
            Self::SqlServer => Box::new(SqlServerGrammar::with_config(config)),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "sqlsrv" | "sqlserver" | "mssql" => Ok(Self::SqlServer),
            other => Err(GrammarError::invalid_option(format!(
                "unknown dialect `{other}`"
            ))),
        }
    }
}
