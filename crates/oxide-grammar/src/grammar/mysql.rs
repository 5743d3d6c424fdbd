//! MySQL grammar.

use super::{concatenate, json, reject_unrendered_clauses, Grammar};
use crate::config::GrammarConfig;
use crate::error::Result;
use crate::query::{
    BindingBag, BindingKind, ColumnExpr, FullTextOptions, InsertValues, Join, Lock, QueryState, Record,
    UpsertColumn,
};
use crate::value::Value;

const UPSERT_ALIAS: &str = "upsert_alias";

/// MySQL (and MariaDB) grammar.
#[derive(Debug, Default, Clone)]
pub struct MySqlGrammar {
    config: GrammarConfig,
}

impl MySqlGrammar {
    /// Creates a MySQL grammar with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MySQL grammar with the given configuration.
    #[must_use]
    pub const fn with_config(config: GrammarConfig) -> Self {
        Self { config }
    }

    /// `field = json_set(field, path, value)`; booleans are inlined and
    /// documents cast from their JSON text.
    fn compile_json_update_column(&self, key: &str, value: &Value) -> Result<String> {
        let value = match value {
            Value::Bool(true) => String::from("true"),
            Value::Bool(false) => String::from("false"),
            Value::Json(doc) if doc.is_array() || doc.is_object() => {
                String::from("cast(? as json)")
            }
            other => self.parameter(other),
        };
        let (field, path) = self.wrap_json_field_and_path(key)?;
        Ok(format!("{field} = json_set({field}{path}, {value})"))
    }

    /// Order and limit allowed on single-table UPDATE and DELETE.
    fn append_order_and_limit(&self, query: &QueryState, sql: String) -> Result<String> {
        let limit = query
            .limit
            .map(|limit| self.compile_limit(limit, None))
            .unwrap_or_default();
        Ok(concatenate([sql, self.compile_orders(&query.orders)?, limit]))
    }
}

impl Grammar for MySqlGrammar {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn config(&self) -> &GrammarConfig {
        &self.config
    }

    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_owned();
        }
        format!("`{}`", value.replace('`', "``"))
    }

    fn compile_lock(&self, _query: &QueryState, lock: &Lock) -> String {
        match lock {
            Lock::Exclusive => String::from("for update"),
            Lock::Shared => String::from("lock in share mode"),
            Lock::Raw(sql) => sql.clone(),
        }
    }

    fn compile_random(&self, seed: Option<&str>) -> String {
        format!("RAND({})", seed.unwrap_or_default())
    }

    fn compile_join_lateral(&self, join: &Join, expression: &str) -> Result<String> {
        Ok(format!(
            "{} join lateral {expression} on true",
            join.kind.as_str()
        ))
    }

    fn where_null(&self, column: &ColumnExpr) -> Result<String> {
        if let ColumnExpr::Name(name) = column {
            if json::is_selector(name) {
                let (field, path) = self.wrap_json_field_and_path(name)?;
                return Ok(format!(
                    "(json_extract({field}{path}) is null OR json_type(json_extract({field}{path})) = 'NULL')"
                ));
            }
        }
        Ok(format!("{} is null", self.wrap_column(column)?))
    }

    fn where_not_null(&self, column: &ColumnExpr) -> Result<String> {
        if let ColumnExpr::Name(name) = column {
            if json::is_selector(name) {
                let (field, path) = self.wrap_json_field_and_path(name)?;
                return Ok(format!(
                    "(json_extract({field}{path}) is not null AND json_type(json_extract({field}{path})) != 'NULL')"
                ));
            }
        }
        Ok(format!("{} is not null", self.wrap_column(column)?))
    }

    fn where_like(
        &self,
        column: &ColumnExpr,
        value: &Value,
        case_sensitive: bool,
        not: bool,
    ) -> Result<String> {
        let not = if not { "not " } else { "" };
        let like = if case_sensitive { "like binary" } else { "like" };
        self.where_basic(column, &format!("{not}{like}"), value)
    }

    fn where_full_text(
        &self,
        columns: &[ColumnExpr],
        value: &Value,
        options: &FullTextOptions,
    ) -> Result<String> {
        let boolean = options.mode.as_deref() == Some("boolean");
        let mode = if boolean {
            " in boolean mode"
        } else {
            " in natural language mode"
        };
        let expanded = if options.expanded && !boolean {
            " with query expansion"
        } else {
            ""
        };
        Ok(format!(
            "match ({}) against ({}{mode}{expanded})",
            self.columnize(columns)?,
            self.parameter(value)
        ))
    }

    fn wrap_json_selector(&self, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(value)?;
        Ok(format!("json_unquote(json_extract({field}{path}))"))
    }

    fn wrap_json_boolean_selector(&self, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(value)?;
        Ok(format!("json_extract({field}{path})"))
    }

    fn compile_json_contains_key(&self, column: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!("ifnull(json_contains_path({field}, 'one'{path}), 0)"))
    }

    fn compile_json_length(&self, column: &str, operator: &str, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!("json_length({field}{path}) {operator} {value}"))
    }

    fn compile_insert(&self, query: &QueryState, values: &InsertValues) -> Result<String> {
        let table = self.compile_write_table(query)?;
        if values.is_empty() {
            return Ok(format!("insert into {table} () values ()"));
        }
        self.compile_insert_rows(&table, values)
    }

    fn compile_insert_or_ignore(&self, query: &QueryState, values: &InsertValues) -> Result<String> {
        let sql = self.compile_insert(query, values)?;
        Ok(sql.replacen("insert", "insert ignore", 1))
    }

    fn compile_upsert(
        &self,
        query: &QueryState,
        values: &InsertValues,
        _unique_by: &[String],
        update: &[UpsertColumn],
    ) -> Result<String> {
        let use_alias = self.config.use_upsert_alias;
        let mut sql = self.compile_insert(query, values)?;
        if use_alias {
            sql.push_str(" as ");
            sql.push_str(&self.wrap(UPSERT_ALIAS)?);
        }
        sql.push_str(" on duplicate key update ");
        let columns = update
            .iter()
            .map(|column| {
                Ok(match column {
                    UpsertColumn::Value(name, value) => {
                        format!("{} = {}", self.wrap(name)?, self.parameter(value))
                    }
                    UpsertColumn::Column(name) if use_alias => {
                        let wrapped = self.wrap(name)?;
                        format!("{wrapped} = {}.{wrapped}", self.wrap(UPSERT_ALIAS)?)
                    }
                    UpsertColumn::Column(name) => {
                        let wrapped = self.wrap(name)?;
                        format!("{wrapped} = values({wrapped})")
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(&columns.join(", "));
        Ok(sql)
    }

    /// Single-table statements take a limit; multi-table ones do not.
    fn validate_write(&self, query: &QueryState, statement: &str) -> Result<()> {
        reject_unrendered_clauses(self, query, statement, query.joins.is_empty())
    }

    fn compile_update_columns(&self, _query: &QueryState, values: &Record) -> Result<String> {
        Ok(values
            .iter()
            .map(|(column, value)| {
                if json::is_selector(column) {
                    self.compile_json_update_column(column, value)
                } else {
                    Ok(format!("{} = {}", self.wrap(column)?, self.parameter(value)))
                }
            })
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn compile_update_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        columns: &str,
        wheres: &str,
    ) -> Result<String> {
        let sql = concatenate([format!("update {table} set {columns}"), wheres.to_owned()]);
        self.append_order_and_limit(query, sql)
    }

    fn compile_delete_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        wheres: &str,
    ) -> Result<String> {
        let sql = concatenate([format!("delete from {table}"), wheres.to_owned()]);
        self.append_order_and_limit(query, sql)
    }

    fn prepare_bindings_for_update(
        &self,
        query: &QueryState,
        bindings: &BindingBag,
        values: &Record,
    ) -> Vec<Value> {
        let values = values
            .iter()
            .filter(|(column, value)| !(json::is_selector(column) && matches!(value, Value::Bool(_))))
            .map(|(_, value)| match value {
                Value::Json(doc) if doc.is_array() || doc.is_object() => value.to_json_text(),
                _ => value.clone(),
            })
            .collect();
        let after: &[BindingKind] = if query.joins.is_empty() {
            &[BindingKind::Where, BindingKind::Order]
        } else {
            &[BindingKind::Where]
        };
        bindings.for_update(&[BindingKind::From, BindingKind::Join], values, after)
    }

    fn prepare_bindings_for_delete(&self, query: &QueryState, bindings: &BindingBag) -> Vec<Value> {
        if query.joins.is_empty() {
            return bindings.flatten_only(&[
                BindingKind::From,
                BindingKind::Where,
                BindingKind::Order,
            ]);
        }
        bindings.flatten_only(&[BindingKind::From, BindingKind::Join, BindingKind::Where])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;
    use crate::query::{Direction, Order, TableRef, WhereNode};
    use serde_json::json;

    fn sql(query: &QueryState) -> String {
        MySqlGrammar::new().compile_select(query).unwrap()
    }

    #[test]
    fn test_backtick_quoting() {
        assert_eq!(sql(&QueryState::table("users")), "select * from `users`");
        assert_eq!(MySqlGrammar::new().wrap_value("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_pagination_and_locks() {
        let query = QueryState::table("users").limit(10).offset(20);
        assert_eq!(sql(&query), "select * from `users` limit 10 offset 20");
        let query = QueryState::table("users").lock(Lock::Exclusive);
        assert_eq!(sql(&query), "select * from `users` for update");
        let query = QueryState::table("users").lock(Lock::Shared);
        assert_eq!(sql(&query), "select * from `users` lock in share mode");
    }

    #[test]
    fn test_like() {
        let mut query = QueryState::table("users").and_where(WhereNode::like("name", "%a%"));
        query.wheres.push(
            crate::query::Boolean::And,
            WhereNode::Like {
                column: ColumnExpr::from("code"),
                value: Value::Text(String::from("A%")),
                case_sensitive: true,
                not: true,
            },
        );
        assert_eq!(
            sql(&query),
            "select * from `users` where `name` like ? and `code` not like binary ?"
        );
    }

    #[test]
    fn test_json_selectors() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("options->language", "en"))
            .and_where(WhereNode::null("options->deleted"))
            .and_where(WhereNode::JsonBoolean {
                column: String::from("options->active"),
                operator: String::from("="),
                value: true,
            });
        assert_eq!(
            sql(&query),
            "select * from `users` where json_unquote(json_extract(`options`, '$.\"language\"')) = ? \
             and (json_extract(`options`, '$.\"deleted\"') is null OR json_type(json_extract(`options`, '$.\"deleted\"')) = 'NULL') \
             and json_extract(`options`, '$.\"active\"') = true"
        );
    }

    #[test]
    fn test_json_contains_is_unsupported() {
        let query = QueryState::table("users").and_where(WhereNode::JsonContains {
            column: String::from("options->tags"),
            value: Value::Text(String::from("x")),
            not: false,
        });
        assert_eq!(
            MySqlGrammar::new().compile_select(&query),
            Err(GrammarError::unsupported("mysql", "JSON contains"))
        );
    }

    #[test]
    fn test_json_key_and_length() {
        let query = QueryState::table("users")
            .and_where(WhereNode::JsonContainsKey {
                column: String::from("options->languages"),
                not: false,
            })
            .and_where(WhereNode::JsonLength {
                column: String::from("options->languages"),
                operator: String::from(">"),
                value: Value::Int(1),
            });
        assert_eq!(
            sql(&query),
            "select * from `users` where ifnull(json_contains_path(`options`, 'one', '$.\"languages\"'), 0) \
             and json_length(`options`, '$.\"languages\"') > ?"
        );
    }

    #[test]
    fn test_full_text() {
        let query = QueryState::table("posts").and_where(WhereNode::FullText {
            columns: vec![ColumnExpr::from("title"), ColumnExpr::from("body")],
            value: Value::Text(String::from("rust")),
            options: FullTextOptions {
                expanded: true,
                ..FullTextOptions::default()
            },
        });
        assert_eq!(
            sql(&query),
            "select * from `posts` where match (`title`, `body`) against (? in natural language mode with query expansion)"
        );
    }

    #[test]
    fn test_insert_variants() {
        let grammar = MySqlGrammar::new();
        let table = QueryState::table("users");
        assert_eq!(
            grammar
                .compile_insert(&table, &InsertValues::Batch(Vec::new()))
                .unwrap(),
            "insert into `users` () values ()"
        );
        let values = InsertValues::Single(Record::new().set("email", "a@x"));
        assert_eq!(
            grammar.compile_insert_or_ignore(&table, &values).unwrap(),
            "insert ignore into `users` (`email`) values (?)"
        );
    }

    #[test]
    fn test_upsert() {
        let values = InsertValues::Single(Record::new().set("email", "a@x").set("name", "A"));
        let update = vec![
            UpsertColumn::Column(String::from("name")),
            UpsertColumn::Value(String::from("visits"), Value::raw("visits + 1")),
        ];
        let table = QueryState::table("users");
        assert_eq!(
            MySqlGrammar::new()
                .compile_upsert(&table, &values, &[String::from("email")], &update)
                .unwrap(),
            "insert into `users` (`email`, `name`) values (?, ?) on duplicate key update `name` = values(`name`), `visits` = visits + 1"
        );
        let aliased = MySqlGrammar::with_config(GrammarConfig::new().with_upsert_alias(true));
        assert_eq!(
            aliased
                .compile_upsert(&table, &values, &[String::from("email")], &update[..1])
                .unwrap(),
            "insert into `users` (`email`, `name`) values (?, ?) as `upsert_alias` on duplicate key update `name` = `upsert_alias`.`name`"
        );
    }

    #[test]
    fn test_update_with_order_limit_and_json() {
        let grammar = MySqlGrammar::new();
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("id", 1_i64))
            .order_by(Order::Column {
                column: ColumnExpr::from("id"),
                direction: Direction::Desc,
            })
            .limit(1);
        let values = Record::new()
            .set("options->enabled", true)
            .set("options->tags", json!(["a"]))
            .set("name", "x");
        assert_eq!(
            grammar.compile_update(&query, &values).unwrap(),
            "update `users` set `options` = json_set(`options`, '$.\"enabled\"', true), \
             `options` = json_set(`options`, '$.\"tags\"', cast(? as json)), `name` = ? \
             where `id` = ? order by `id` desc limit 1"
        );
        let bindings =
            grammar.prepare_bindings_for_update(&query, &grammar.collect_bindings(&query), &values);
        assert_eq!(
            bindings,
            vec![
                Value::Text(String::from("[\"a\"]")),
                Value::Text(String::from("x")),
                Value::Int(1),
            ]
        );
    }

    #[test]
    fn test_update_with_joins_binds_join_values_first() {
        let grammar = MySqlGrammar::new();
        let query = QueryState::table("users").join(
            Join::inner("posts")
                .on("users.id", "=", "posts.user_id")
                .on_where(WhereNode::eq("posts.kind", "x")),
        );
        let values = Record::new().set("name", "n");
        assert_eq!(
            grammar.compile_update(&query, &values).unwrap(),
            "update `users` inner join `posts` on `users`.`id` = `posts`.`user_id` and `posts`.`kind` = ? set `name` = ?"
        );
        assert_eq!(
            grammar.prepare_bindings_for_update(&query, &grammar.collect_bindings(&query), &values),
            vec![Value::Text(String::from("x")), Value::Text(String::from("n"))]
        );
    }

    #[test]
    fn test_delete_with_limit() {
        let query = QueryState::table("logs").limit(100);
        assert_eq!(
            MySqlGrammar::new().compile_delete(&query).unwrap(),
            "delete from `logs` limit 100"
        );
    }

    #[test]
    fn test_delete_binds_rendered_order_only() {
        let grammar = MySqlGrammar::new();
        let order = Order::Raw {
            sql: String::from("field(`id`, ?)"),
            bindings: vec![Value::Int(7)],
        };
        let single = QueryState::table("logs")
            .and_where(WhereNode::eq("level", "debug"))
            .order_by(order.clone())
            .limit(10);
        let compiled = grammar.to_delete(&single).unwrap();
        assert_eq!(
            compiled.sql,
            "delete from `logs` where `level` = ? order by field(`id`, ?) limit 10"
        );
        assert_eq!(
            compiled.bindings,
            vec![Value::Text(String::from("debug")), Value::Int(7)]
        );

        let joined = QueryState::table("logs")
            .join(Join::inner("hosts").on("hosts.id", "=", "logs.host_id"))
            .and_where(WhereNode::eq("hosts.retired", true))
            .order_by(order);
        let compiled = grammar.to_delete(&joined).unwrap();
        assert!(!compiled.sql.contains("order by"));
        assert_eq!(compiled.bindings, vec![Value::Bool(true)]);
    }

    #[test]
    fn test_joined_writes_reject_limit() {
        let grammar = MySqlGrammar::new();
        let query = QueryState::table("users")
            .join(Join::inner("teams").on("teams.id", "=", "users.team_id"))
            .limit(5);
        assert!(matches!(
            grammar.compile_delete(&query),
            Err(GrammarError::InvalidOption(_))
        ));
        assert!(matches!(
            grammar.compile_update(&query, &Record::new().set("active", false)),
            Err(GrammarError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_lateral_join_and_random() {
        let grammar = MySqlGrammar::new();
        let latest = QueryState::table("posts")
            .and_where(WhereNode::column("posts.user_id", "=", "users.id"))
            .limit(1);
        let mut join = Join::left(TableRef::sub(latest, "latest"));
        join.lateral = true;
        let query = QueryState::table("users").join(join);
        assert_eq!(
            grammar.compile_select(&query).unwrap(),
            "select * from `users` left join lateral (select * from `posts` where `posts`.`user_id` = `users`.`id` limit 1) as `latest` on true"
        );
        assert_eq!(grammar.compile_random(Some("7")), "RAND(7)");
    }

    #[test]
    fn test_lateral_join_requires_sub_select() {
        let mut join = Join::inner("posts");
        join.lateral = true;
        let query = QueryState::table("users").join(join);
        assert!(matches!(
            MySqlGrammar::new().compile_select(&query),
            Err(GrammarError::InvalidOption(_))
        ));
    }
}
