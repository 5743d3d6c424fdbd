//! SQL Server grammar.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    collect, concatenate, reject_unrendered_clauses, split_alias, wrap_prefixed_table,
    CompiledQuery, Grammar, SelectComponent,
};
use crate::config::GrammarConfig;
use crate::error::{GrammarError, Result};
use crate::query::{
    Aggregate, BindingBag, BindingKind, ColumnExpr, DatePart, InsertValues, Join, JoinType, Lock,
    Order, QueryState, Record, TableRef, UpsertColumn,
};
use crate::value::Value;

static TABLE_VALUED_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)(\(.*?\))]$").expect("valid function pattern"));

static TRAILING_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+)\]$").expect("valid index pattern"));

/// Offset renders before the row limit: `offset n rows fetch next m rows only`.
static COMPONENTS: [SelectComponent; 11] = [
    SelectComponent::Aggregate,
    SelectComponent::Columns,
    SelectComponent::From,
    SelectComponent::Joins,
    SelectComponent::Wheres,
    SelectComponent::Groups,
    SelectComponent::Havings,
    SelectComponent::Orders,
    SelectComponent::Offset,
    SelectComponent::Limit,
    SelectComponent::Lock,
];

const UPSERT_SOURCE: &str = "upsert_source";

/// Microsoft SQL Server grammar.
#[derive(Debug, Default, Clone)]
pub struct SqlServerGrammar {
    config: GrammarConfig,
}

impl SqlServerGrammar {
    /// Creates a SQL Server grammar with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a SQL Server grammar with the given configuration.
    #[must_use]
    pub const fn with_config(config: GrammarConfig) -> Self {
        Self { config }
    }

    /// Whether a select body is paginated with `row_number()` instead of
    /// `offset ... fetch`.
    fn uses_row_number(&self, query: &QueryState, aggregate: Option<&Aggregate>) -> bool {
        self.config.legacy_pagination
            && aggregate.is_none()
            && query.offset.unwrap_or(0) > 0
            && query.limit != Some(0)
    }

    /// `select * from (... row_number() over (orders) as row_num ...) as
    /// temp_table where row_num between a and b order by row_num`
    fn compile_row_number_select(&self, query: &QueryState, offset: u64) -> Result<String> {
        let components = self.compile_components(query, None)?;
        let orders = components
            .iter()
            .find(|(component, _)| *component == SelectComponent::Orders)
            .map_or_else(
                || String::from("order by (select 0)"),
                |(_, sql)| sql.clone(),
            );
        let inner = concatenate(components.into_iter().filter_map(|(component, sql)| {
            match component {
                SelectComponent::Orders | SelectComponent::Limit | SelectComponent::Offset => None,
                SelectComponent::Columns => {
                    Some(format!("{sql}, row_number() over ({orders}) as row_num"))
                }
                _ => Some(sql),
            }
        }));
        let start = offset.saturating_add(1);
        let constraint = match query.limit {
            Some(limit) => format!("between {start} and {}", offset.saturating_add(limit)),
            None => format!(">= {start}"),
        };
        let sql = format!(
            "select * from ({inner}) as temp_table where row_num {constraint} order by row_num"
        );
        if query.unions.is_empty() {
            return Ok(sql);
        }
        Ok(format!("{} {}", self.wrap_union(&sql), self.compile_unions(query)?))
    }

    /// The select behind [`Grammar::compile_exists`].
    fn exists_query(query: &QueryState) -> QueryState {
        QueryState {
            columns: Some(vec![ColumnExpr::raw("1 [exists]")]),
            aggregate: None,
            limit: Some(1),
            ..query.clone()
        }
    }

    /// `top (n) ` of an UPDATE or DELETE.
    fn write_top(query: &QueryState) -> String {
        query
            .limit
            .map(|limit| format!("top ({limit}) "))
            .unwrap_or_default()
    }

    fn compile_json_source(&self, column: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!("openjson({field}{path})"))
    }
}

impl Grammar for SqlServerGrammar {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn config(&self) -> &GrammarConfig {
        &self.config
    }

    fn select_components(&self) -> &'static [SelectComponent] {
        &COMPONENTS
    }

    fn compile_select_body(
        &self,
        query: &QueryState,
        aggregate: Option<&Aggregate>,
    ) -> Result<String> {
        let offset = query.offset.unwrap_or(0);
        if query.limit == Some(0) && offset > 0 {
            let empty = QueryState {
                offset: None,
                ..query.clone()
            };
            return self.compile_select_body(&empty, aggregate);
        }
        if self.uses_row_number(query, aggregate) {
            return self.compile_row_number_select(query, offset);
        }
        if offset > 0 && query.orders.is_empty() {
            let mut ordered = query.clone();
            ordered.orders.push(Order::raw("(SELECT 0)"));
            return self.assemble_select(&ordered, aggregate);
        }
        self.assemble_select(query, aggregate)
    }

    fn compile_columns(&self, query: &QueryState, columns: &[ColumnExpr]) -> Result<String> {
        let select = if query.distinct.is_enabled() {
            "select distinct "
        } else {
            "select "
        };
        let top = match query.limit {
            Some(limit) if query.offset.unwrap_or(0) == 0 => format!("top {limit} "),
            _ => String::new(),
        };
        Ok(format!("{select}{top}{}", self.columnize(columns)?))
    }

    /// `from t` followed by the table hint of the lock.
    fn compile_from(&self, query: &QueryState, table: &TableRef) -> Result<String> {
        let hint = match &query.lock {
            Some(Lock::Exclusive) => "with(rowlock,updlock,holdlock)",
            Some(Lock::Shared) => "with(rowlock,holdlock)",
            Some(Lock::Raw(sql)) => sql.as_str(),
            None => "",
        };
        Ok(concatenate([
            format!("from {}", self.compile_table_ref(table)?),
            hint.to_owned(),
        ]))
    }

    fn compile_lock(&self, _query: &QueryState, _lock: &Lock) -> String {
        String::new()
    }

    fn compile_join_lateral(&self, join: &Join, expression: &str) -> Result<String> {
        let apply = match join.kind {
            JoinType::Left => "outer apply",
            JoinType::Inner | JoinType::Right | JoinType::Cross => "cross apply",
        };
        Ok(format!("{apply} {expression}"))
    }

    fn compile_limit(&self, limit: u64, offset: Option<u64>) -> String {
        if limit > 0 && offset.unwrap_or(0) > 0 {
            return format!("fetch next {limit} rows only");
        }
        String::new()
    }

    fn compile_offset(&self, offset: u64) -> String {
        if offset > 0 {
            return format!("offset {offset} rows");
        }
        String::new()
    }

    fn compile_random(&self, _seed: Option<&str>) -> String {
        String::from("NEWID()")
    }

    /// A union has no `top` to carry its limit, so it paginates with
    /// `offset ... fetch`, which needs an order.
    fn compile_unions(&self, query: &QueryState) -> Result<String> {
        let offset = query.union_offset.unwrap_or(0);
        let pagination = match query.union_limit {
            Some(0) => {
                return Err(GrammarError::invalid_option(
                    "sqlserver cannot fetch zero rows of a union",
                ))
            }
            Some(limit) => format!("offset {offset} rows fetch next {limit} rows only"),
            None if offset > 0 => format!("offset {offset} rows"),
            None => String::new(),
        };
        let mut orders = self.compile_orders(&query.union_orders)?;
        if orders.is_empty() && !pagination.is_empty() {
            orders = String::from("order by (SELECT 0)");
        }
        let mut branches = String::new();
        for union in &query.unions {
            branches.push_str(&self.compile_union(union)?);
        }
        Ok(concatenate([
            branches.trim_start().to_owned(),
            orders,
            pagination,
        ]))
    }

    fn wrap_union(&self, sql: &str) -> String {
        format!("select * from ({sql}) as {}", self.wrap_table("temp_table"))
    }

    fn compile_exists(&self, query: &QueryState) -> Result<String> {
        self.compile_select(&Self::exists_query(query))
    }

    /// Binds what the rendered select binds, so row-number pagination keeps
    /// its order values.
    fn to_exists(&self, query: &QueryState) -> Result<CompiledQuery> {
        let exists = Self::exists_query(query);
        let sql = self.compile_select(&exists)?;
        let bindings = self.prepare_bindings_for_select(&self.collect_bindings(&exists));
        Ok(CompiledQuery::traced(self.name(), "exists", sql, bindings))
    }

    fn where_date(
        &self,
        part: DatePart,
        column: &ColumnExpr,
        operator: &str,
        value: &Value,
    ) -> Result<String> {
        match part {
            DatePart::Date | DatePart::Time => Ok(format!(
                "cast({} as {}) {operator} {}",
                self.wrap_column(column)?,
                part.as_str(),
                self.parameter(value)
            )),
            DatePart::Day | DatePart::Month | DatePart::Year => {
                self.date_based_where(part.as_str(), column, operator, value)
            }
        }
    }

    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_owned();
        }
        format!("[{}]", value.replace(']', "]]"))
    }

    /// Table-valued function arguments stay outside the brackets:
    /// `[dbo].[fn](1)`.
    fn wrap_table(&self, table: &str) -> String {
        let wrapped = wrap_prefixed_table(self, table);
        TABLE_VALUED_FUNCTION
            .replace(&wrapped, "$1]$2")
            .into_owned()
    }

    fn wrap_json_selector(&self, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(value)?;
        Ok(format!("json_value({field}{path})"))
    }

    fn wrap_json_boolean_value(&self, value: &str) -> String {
        format!("'{value}'")
    }

    fn compile_json_contains(&self, column: &str, value: &str) -> Result<String> {
        Ok(format!(
            "{value} in (select [value] from {})",
            self.compile_json_source(column)?
        ))
    }

    fn prepare_binding_for_json_contains(&self, value: &Value) -> Value {
        match value {
            Value::Bool(_) => value.to_json_text(),
            _ => value.clone(),
        }
    }

    fn compile_json_contains_key(&self, column: &str) -> Result<String> {
        let mut segments: Vec<&str> = column.split("->").collect();
        let last = segments.pop().unwrap_or_default();
        let key = if let Some(caps) = TRAILING_INDEX.captures(last) {
            let start = caps.get(0).map_or(last.len(), |m| m.start());
            segments.push(&last[..start]);
            caps[1].to_owned()
        } else {
            format!("'{}'", last.replace('\'', "''"))
        };
        Ok(format!(
            "{key} in (select [key] from {})",
            self.compile_json_source(&segments.join("->"))?
        ))
    }

    fn compile_json_length(&self, column: &str, operator: &str, value: &str) -> Result<String> {
        Ok(format!(
            "(select count(*) from {}) {operator} {value}",
            self.compile_json_source(column)?
        ))
    }

    /// `merge t using (values ...) [upsert_source] (cols) on ... when matched
    /// then update set ... when not matched then insert (cols) values (cols);`
    fn compile_upsert(
        &self,
        query: &QueryState,
        values: &InsertValues,
        unique_by: &[String],
        update: &[UpsertColumn],
    ) -> Result<String> {
        let Some(TableRef::Name(name)) = &query.from else {
            return Err(GrammarError::invalid_option("merge requires a plain table name"));
        };
        if unique_by.is_empty() {
            return Err(GrammarError::invalid_option(
                "upsert requires at least one unique column",
            ));
        }
        let target = split_alias(name).map_or(name.as_str(), |(table, _)| table);
        let columns = values.columns()?;
        let column_list = columns
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
        let on = unique_by
            .iter()
            .map(|column| {
                Ok(format!(
                    "{} = {}",
                    self.wrap(&format!("{UPSERT_SOURCE}.{column}"))?,
                    self.wrap(&format!("{target}.{column}"))?
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .join(" and ");
        let assignments = update
            .iter()
            .map(|column| {
                Ok(match column {
                    UpsertColumn::Column(name) => format!(
                        "{} = {}",
                        self.wrap(name)?,
                        self.wrap(&format!("{UPSERT_SOURCE}.{name}"))?
                    ),
                    UpsertColumn::Value(name, value) => {
                        format!("{} = {}", self.wrap(name)?, self.parameter(value))
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        Ok(format!(
            "merge {} using (values {rows}) {} ({column_list}) on {on} \
             when matched then update set {assignments} \
             when not matched then insert ({column_list}) values ({column_list});",
            self.wrap_table(target),
            self.wrap_table(UPSERT_SOURCE)
        ))
    }

    /// Limits land in `top (n)`; nothing renders an offset.
    fn validate_write(&self, query: &QueryState, statement: &str) -> Result<()> {
        reject_unrendered_clauses(self, query, statement, true)
    }

    fn compile_update_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        columns: &str,
        wheres: &str,
    ) -> Result<String> {
        Ok(concatenate([
            format!("update {}{table} set {columns}", Self::write_top(query)),
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
        let alias = table.rsplit(" as ").next().unwrap_or(table);
        let joins = self.compile_joins(query, &query.joins)?;
        Ok(concatenate([
            format!(
                "update {}{alias} set {columns} from {table} {joins}",
                Self::write_top(query)
            ),
            wheres.to_owned(),
        ]))
    }

    fn compile_delete_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        wheres: &str,
    ) -> Result<String> {
        Ok(concatenate([
            format!("delete {}from {table}", Self::write_top(query)),
            wheres.to_owned(),
        ]))
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
            format!("delete {}{alias} from {table} {joins}", Self::write_top(query)),
            wheres.to_owned(),
        ]))
    }

    fn compile_savepoint(&self, name: &str) -> Result<String> {
        Ok(format!("SAVE TRANSACTION {name}"))
    }

    fn compile_savepoint_rollback(&self, name: &str) -> Result<String> {
        Ok(format!("ROLLBACK TRANSACTION {name}"))
    }

    fn date_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S%.3f"
    }

    /// Row-number pagination binds the order values right after the select
    /// list, where the `over (...)` clause renders them.
    fn collect_bindings(&self, query: &QueryState) -> BindingBag {
        let mut bag = collect::bindings(self, query);
        let aggregate = query
            .aggregate
            .as_ref()
            .filter(|_| query.unions.is_empty() && query.havings.is_empty());
        if self.uses_row_number(query, aggregate) {
            let order = std::mem::take(&mut bag.order);
            bag.extend(BindingKind::Select, order);
        }
        bag
    }

    /// With joins the table and its joins follow the SET clause.
    fn prepare_bindings_for_update(
        &self,
        query: &QueryState,
        bindings: &BindingBag,
        values: &Record,
    ) -> Vec<Value> {
        let values = values.iter().map(|(_, value)| value.clone()).collect();
        if query.joins.is_empty() {
            return bindings.for_update(&[BindingKind::From], values, &[BindingKind::Where]);
        }
        bindings.for_update(
            &[],
            values,
            &[BindingKind::From, BindingKind::Join, BindingKind::Where],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{WhereNode, WhereTree};
    use chrono::NaiveDate;

    fn sql(query: &QueryState) -> String {
        SqlServerGrammar::new().compile_select(query).unwrap()
    }

    fn legacy() -> SqlServerGrammar {
        SqlServerGrammar::with_config(GrammarConfig::new().with_legacy_pagination(true))
    }

    #[test]
    fn test_bracket_quoting() {
        let grammar = SqlServerGrammar::new();
        assert_eq!(
            sql(&QueryState::table("users")
                .select(vec!["id", "name"])
                .and_where(WhereNode::eq("name", "a"))),
            "select [id], [name] from [users] where [name] = ?"
        );
        assert_eq!(grammar.wrap_value("odd]name"), "[odd]]name]");
        assert_eq!(grammar.wrap_table("dbo.fn_users(1)"), "[dbo].[fn_users](1)");
        assert_eq!(grammar.wrap_table("users as u"), "[users] as [u]");
    }

    #[test]
    fn test_top_without_offset() {
        assert_eq!(
            sql(&QueryState::table("users").limit(10)),
            "select top 10 * from [users]"
        );
    }

    #[test]
    fn test_offset_fetch() {
        let query = QueryState::table("users")
            .order_by(Order::asc("id"))
            .limit(10)
            .offset(20);
        assert_eq!(
            sql(&query),
            "select * from [users] order by [id] asc offset 20 rows fetch next 10 rows only"
        );
        assert_eq!(
            sql(&QueryState::table("users").offset(5)),
            "select * from [users] order by (SELECT 0) offset 5 rows"
        );
    }

    #[test]
    fn test_legacy_row_number_pagination() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("active", true))
            .order_by(Order::desc("id"))
            .limit(10)
            .offset(20);
        assert_eq!(
            legacy().compile_select(&query).unwrap(),
            "select * from (select *, row_number() over (order by [id] desc) as row_num from [users] \
             where [active] = ?) as temp_table where row_num between 21 and 30 order by row_num"
        );
        assert_eq!(
            legacy()
                .compile_select(&QueryState::table("users").offset(5))
                .unwrap(),
            "select * from (select *, row_number() over (order by (select 0)) as row_num from [users]) \
             as temp_table where row_num >= 6 order by row_num"
        );
    }

    #[test]
    fn test_legacy_pagination_binds_order_first() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("active", true))
            .order_by(Order::Raw {
                sql: String::from("case when [name] = ? then 0 else 1 end"),
                bindings: vec![Value::Text(String::from("x"))],
            })
            .offset(5);
        let compiled = legacy().to_select(&query).unwrap();
        assert!(compiled
            .sql
            .starts_with("select * from (select *, row_number() over (order by case when [name] = ? then 0 else 1 end)"));
        assert_eq!(
            compiled.bindings,
            vec![Value::Text(String::from("x")), Value::Bool(true)]
        );
    }

    #[test]
    fn test_locks_are_table_hints() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("id", 1_i64))
            .lock(Lock::Exclusive);
        assert_eq!(
            sql(&query),
            "select * from [users] with(rowlock,updlock,holdlock) where [id] = ?"
        );
        assert_eq!(
            sql(&QueryState::table("users").lock(Lock::Shared)),
            "select * from [users] with(rowlock,holdlock)"
        );
        assert_eq!(
            sql(&QueryState::table("users").lock(Lock::Raw(String::from("with(nolock)")))),
            "select * from [users] with(nolock)"
        );
    }

    #[test]
    fn test_date_parts() {
        let query = QueryState::table("posts")
            .and_where(WhereNode::date(DatePart::Date, "created_at", "=", "2024-01-01"))
            .and_where(WhereNode::date(DatePart::Day, "created_at", "=", 3_i64));
        assert_eq!(
            sql(&query),
            "select * from [posts] where cast([created_at] as date) = ? and day([created_at]) = ?"
        );
    }

    #[test]
    fn test_json_predicates() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("options->language", "en"))
            .and_where(WhereNode::JsonContains {
                column: String::from("options->tags"),
                value: Value::Text(String::from("a")),
                not: false,
            })
            .and_where(WhereNode::JsonContainsKey {
                column: String::from("options->theme"),
                not: false,
            })
            .and_where(WhereNode::JsonContainsKey {
                column: String::from("options->tags[2]"),
                not: true,
            })
            .and_where(WhereNode::JsonLength {
                column: String::from("options->tags"),
                operator: String::from(">"),
                value: Value::Int(1),
            })
            .and_where(WhereNode::JsonBoolean {
                column: String::from("options->active"),
                operator: String::from("="),
                value: true,
            });
        let compiled = SqlServerGrammar::new().to_select(&query).unwrap();
        assert_eq!(
            compiled.sql,
            "select * from [users] where json_value([options], '$.\"language\"') = ? \
             and ? in (select [value] from openjson([options], '$.\"tags\"')) \
             and 'theme' in (select [key] from openjson([options])) \
             and not 2 in (select [key] from openjson([options], '$.\"tags\"')) \
             and (select count(*) from openjson([options], '$.\"tags\"')) > ? \
             and json_value([options], '$.\"active\"') = 'true'"
        );
        assert_eq!(
            compiled.bindings,
            vec![
                Value::Text(String::from("en")),
                Value::Text(String::from("a")),
                Value::Int(1),
            ]
        );
    }

    #[test]
    fn test_unions_select_from_temp_table() {
        let query = QueryState::table("a").union(QueryState::table("b"), false);
        assert_eq!(
            sql(&query),
            "select * from (select * from [a]) as [temp_table] union select * from (select * from [b]) as [temp_table]"
        );
    }

    #[test]
    fn test_exists_selects_top_one() {
        let query = QueryState::table("users")
            .select(vec![ColumnExpr::Raw {
                sql: String::from("? as flag"),
                bindings: vec![Value::Int(9)],
            }])
            .and_where(WhereNode::eq("id", 1_i64));
        let compiled = SqlServerGrammar::new().to_exists(&query).unwrap();
        assert_eq!(
            compiled.sql,
            "select top 1 1 [exists] from [users] where [id] = ?"
        );
        assert_eq!(compiled.bindings, vec![Value::Int(1)]);
    }

    #[test]
    fn test_update_with_joins() {
        let grammar = SqlServerGrammar::new();
        let query = QueryState::table("users as u")
            .join(Join::inner("posts as p").on("u.id", "=", "p.user_id"))
            .and_where(WhereNode::eq("p.spam", true));
        let compiled = grammar
            .to_update(&query, &Record::new().set("banned", true))
            .unwrap();
        assert_eq!(
            compiled.sql,
            "update [u] set [banned] = ? from [users] as [u] inner join [posts] as [p] \
             on [u].[id] = [p].[user_id] where [p].[spam] = ?"
        );
        assert_eq!(compiled.bindings, vec![Value::Bool(true), Value::Bool(true)]);
    }

    #[test]
    fn test_delete_top() {
        let query = QueryState::table("logs")
            .and_where(WhereNode::basic("id", "<", 10_i64))
            .limit(5);
        assert_eq!(
            SqlServerGrammar::new().compile_delete(&query).unwrap(),
            "delete top (5) from [logs] where [id] < ?"
        );
    }

    #[test]
    fn test_limited_writes_use_top() {
        let grammar = SqlServerGrammar::new();
        let values = Record::new().set("a", 2_i64);
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("id", 1_i64))
            .limit(3);
        assert_eq!(
            grammar.compile_update(&query, &values).unwrap(),
            "update top (3) [users] set [a] = ? where [id] = ?"
        );

        let joined = QueryState::table("users as u")
            .join(Join::inner("posts as p").on("u.id", "=", "p.user_id"))
            .and_where(WhereNode::eq("p.spam", true))
            .order_by(Order::Raw {
                sql: String::from("case when [u].[name] = ? then 0 else 1 end"),
                bindings: vec![Value::Int(7)],
            })
            .limit(2);
        let compiled = grammar.to_delete(&joined).unwrap();
        assert_eq!(
            compiled.sql,
            "delete top (2) [u] from [users] as [u] inner join [posts] as [p] \
             on [u].[id] = [p].[user_id] where [p].[spam] = ?"
        );
        assert_eq!(compiled.bindings, vec![Value::Bool(true)]);
        let compiled = grammar.to_update(&joined, &values).unwrap();
        assert!(compiled.sql.starts_with("update top (2) [u] set [a] = ? from [users] as [u]"));
        assert_eq!(compiled.bindings, vec![Value::Int(2), Value::Bool(true)]);
    }

    #[test]
    fn test_writes_reject_offset() {
        let query = QueryState::table("logs").limit(5).offset(10);
        assert!(matches!(
            SqlServerGrammar::new().compile_delete(&query),
            Err(GrammarError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_limit_zero_selects_nothing() {
        assert_eq!(
            sql(&QueryState::table("users").limit(0)),
            "select top 0 * from [users]"
        );
        let paged = QueryState::table("users")
            .order_by(Order::Raw {
                sql: String::from("case when [name] = ? then 0 else 1 end"),
                bindings: vec![Value::Text(String::from("x"))],
            })
            .limit(0)
            .offset(10);
        let compiled = legacy().to_select(&paged).unwrap();
        assert_eq!(
            compiled.sql,
            "select top 0 * from [users] order by case when [name] = ? then 0 else 1 end"
        );
        assert_eq!(compiled.bindings, vec![Value::Text(String::from("x"))]);
    }

    #[test]
    fn test_union_limit_fetches_rows() {
        let mut query = QueryState::table("a").union(QueryState::table("b"), false);
        query.union_limit = Some(5);
        assert_eq!(
            sql(&query),
            "select * from (select * from [a]) as [temp_table] union select * from (select * from [b]) as [temp_table] \
             order by (SELECT 0) offset 0 rows fetch next 5 rows only"
        );

        query.union_offset = Some(10);
        query.union_orders.push(Order::asc("id"));
        assert!(sql(&query).ends_with("order by [id] asc offset 10 rows fetch next 5 rows only"));

        query.union_limit = Some(0);
        assert!(matches!(
            SqlServerGrammar::new().compile_select(&query),
            Err(GrammarError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_legacy_exists_binds_order() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("active", true))
            .order_by(Order::Raw {
                sql: String::from("case when [name] = ? then 0 else 1 end"),
                bindings: vec![Value::Text(String::from("x"))],
            })
            .offset(5);
        let compiled = legacy().to_exists(&query).unwrap();
        assert_eq!(
            compiled.sql,
            "select * from (select 1 [exists], row_number() over (order by case when [name] = ? then 0 else 1 end) \
             as row_num from [users] where [active] = ?) as temp_table where row_num between 6 and 6 order by row_num"
        );
        assert_eq!(
            compiled.bindings,
            vec![Value::Text(String::from("x")), Value::Bool(true)]
        );
    }

    #[test]
    fn test_merge_upsert() {
        let grammar = SqlServerGrammar::new();
        let values = InsertValues::Batch(vec![
            Record::new().set("email", "a@x").set("name", "A"),
            Record::new().set("email", "b@x").set("name", "B"),
        ]);
        let compiled = grammar
            .to_upsert(
                &QueryState::table("users"),
                &values,
                &[String::from("email")],
                &[UpsertColumn::Column(String::from("name"))],
            )
            .unwrap();
        assert_eq!(
            compiled.sql,
            "merge [users] using (values (?, ?), (?, ?)) [upsert_source] ([email], [name]) \
             on [upsert_source].[email] = [users].[email] \
             when matched then update set [name] = [upsert_source].[name] \
             when not matched then insert ([email], [name]) values ([email], [name]);"
        );
        assert_eq!(compiled.bindings.len(), 4);
        assert!(matches!(
            grammar.compile_upsert(
                &QueryState::table("users"),
                &values,
                &[],
                &[UpsertColumn::Column(String::from("name"))]
            ),
            Err(GrammarError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_lateral_joins_use_apply() {
        let latest = QueryState::table("posts")
            .and_where(WhereNode::column("posts.user_id", "=", "users.id"))
            .limit(1);
        let mut join = Join::left(TableRef::sub(latest, "latest"));
        join.lateral = true;
        assert_eq!(
            sql(&QueryState::table("users").join(join)),
            "select * from [users] outer apply (select top 1 * from [posts] where [posts].[user_id] = [users].[id]) as [latest]"
        );
    }

    #[test]
    fn test_misc_dialect_strings() {
        let grammar = SqlServerGrammar::new();
        assert_eq!(grammar.compile_random(None), "NEWID()");
        assert_eq!(grammar.compile_savepoint("s1").unwrap(), "SAVE TRANSACTION s1");
        assert_eq!(
            grammar.compile_savepoint_rollback("s1").unwrap(),
            "ROLLBACK TRANSACTION s1"
        );
        let moment = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 6)
            .unwrap();
        assert_eq!(
            grammar.format_datetime(&moment),
            Value::Text(String::from("2024-01-02 03:04:05.006"))
        );
        assert!(matches!(
            grammar.compile_insert_or_ignore(
                &QueryState::table("users"),
                &InsertValues::Single(Record::new().set("a", 1_i64))
            ),
            Err(GrammarError::Unsupported { .. })
        ));
        assert!(matches!(
            grammar.compile_select(&QueryState::table("users").and_where(WhereNode::nested(WhereTree::new()))),
            Err(GrammarError::MalformedState(_))
        ));
    }
}
