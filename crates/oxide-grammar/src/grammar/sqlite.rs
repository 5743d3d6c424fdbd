//! SQLite grammar.

use super::{
    concatenate, json, missing_table, postgres, row_identifier_filter, split_alias, Grammar,
};
use crate::config::GrammarConfig;
use crate::error::{GrammarError, Result};
use crate::query::{
    BindingBag, BindingKind, ColumnExpr, DatePart, InsertValues, Lock, QueryState, Record, TableRef,
    UpsertColumn,
};
use crate::value::Value;

/// SQLite grammar.
#[derive(Debug, Default, Clone)]
pub struct SqliteGrammar {
    config: GrammarConfig,
}

impl SqliteGrammar {
    /// Creates a SQLite grammar with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a SQLite grammar with the given configuration.
    #[must_use]
    pub const fn with_config(config: GrammarConfig) -> Self {
        Self { config }
    }
}

/// Last dot-separated segment of an assignment key.
fn unqualified(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// Merges the JSON-path assignments of an UPDATE into one document per
/// root column, in order of first appearance.
fn json_update_groups(values: &Record) -> Vec<(String, serde_json::Value)> {
    let mut groups: Vec<(String, serde_json::Value)> = Vec::new();
    for (key, value) in values.iter().filter(|(key, _)| json::is_selector(key)) {
        let path = key.split_once('.').map_or(key, |(_, rest)| rest);
        let mut segments = path.split("->");
        let root = segments.next().unwrap_or_default();
        let index = if let Some(index) = groups.iter().position(|(name, _)| name == root) {
            index
        } else {
            groups.push((root.to_owned(), serde_json::Value::Null));
            groups.len() - 1
        };
        let mut target = &mut groups[index].1;
        for segment in segments {
            if !target.is_object() {
                *target = serde_json::Value::Object(serde_json::Map::new());
            }
            target = &mut target[segment];
        }
        *target = value.to_json();
    }
    groups
}

impl Grammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn config(&self) -> &GrammarConfig {
        &self.config
    }

    fn wrap_union(&self, sql: &str) -> String {
        format!("select * from ({sql})")
    }

    fn compile_lock(&self, _query: &QueryState, _lock: &Lock) -> String {
        String::new()
    }

    fn where_like(
        &self,
        column: &ColumnExpr,
        value: &Value,
        case_sensitive: bool,
        not: bool,
    ) -> Result<String> {
        if !case_sensitive {
            let operator = if not { "not like" } else { "like" };
            return self.where_basic(column, operator, value);
        }
        let operator = if not { "not glob" } else { "glob" };
        self.where_basic(column, operator, value)
    }

    fn prepare_where_like_binding(&self, value: &Value, case_sensitive: bool) -> Value {
        match value {
            Value::Text(pattern) if case_sensitive => {
                let mut glob = String::with_capacity(pattern.len());
                for c in pattern.chars() {
                    match c {
                        '*' => glob.push_str("[*]"),
                        '?' => glob.push_str("[?]"),
                        '%' => glob.push('*'),
                        '_' => glob.push('?'),
                        other => glob.push(other),
                    }
                }
                Value::Text(glob)
            }
            _ => value.clone(),
        }
    }

    fn where_date(
        &self,
        part: DatePart,
        column: &ColumnExpr,
        operator: &str,
        value: &Value,
    ) -> Result<String> {
        let format = match part {
            DatePart::Date => "%Y-%m-%d",
            DatePart::Time => "%H:%M:%S",
            DatePart::Day => "%d",
            DatePart::Month => "%m",
            DatePart::Year => "%Y",
        };
        Ok(format!(
            "strftime('{format}', {}) {operator} cast({} as text)",
            self.wrap_column(column)?,
            self.parameter(value)
        ))
    }

    fn wrap_json_selector(&self, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(value)?;
        Ok(format!("json_extract({field}{path})"))
    }

    fn compile_json_contains(&self, column: &str, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!(
            "exists (select 1 from json_each({field}{path}) where {}.{} is {value})",
            self.wrap_value("json_each"),
            self.wrap_value("value")
        ))
    }

    fn prepare_binding_for_json_contains(&self, value: &Value) -> Value {
        match value {
            Value::Bool(_) => value.to_json_text(),
            _ => value.clone(),
        }
    }

    fn compile_json_contains_key(&self, column: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!("json_type({field}{path}) is not null"))
    }

    fn compile_json_length(&self, column: &str, operator: &str, value: &str) -> Result<String> {
        let (field, path) = self.wrap_json_field_and_path(column)?;
        Ok(format!("json_array_length({field}{path}) {operator} {value}"))
    }

    fn compile_insert_or_ignore(&self, query: &QueryState, values: &InsertValues) -> Result<String> {
        Ok(self
            .compile_insert(query, values)?
            .replacen("insert", "insert or ignore", 1))
    }

    fn compile_upsert(
        &self,
        query: &QueryState,
        values: &InsertValues,
        unique_by: &[String],
        update: &[UpsertColumn],
    ) -> Result<String> {
        postgres::compile_conflict_upsert(self, query, values, unique_by, update)
    }

    fn validate_write(&self, query: &QueryState, statement: &str) -> Result<()> {
        postgres::validate_row_identifier_write(self, query, statement)
    }

    fn compile_update_columns(&self, _query: &QueryState, values: &Record) -> Result<String> {
        let mut columns = values
            .iter()
            .filter(|(key, _)| !json::is_selector(key))
            .map(|(key, value)| {
                Ok(format!(
                    "{} = {}",
                    self.wrap(unqualified(key))?,
                    self.parameter(value)
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        for (column, _) in json_update_groups(values) {
            let column = self.wrap(&column)?;
            columns.push(format!(
                "{column} = json_patch(ifnull({column}, json('{{}}')), json(?))"
            ));
        }
        Ok(columns.join(", "))
    }

    fn compile_update_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        columns: &str,
        wheres: &str,
    ) -> Result<String> {
        if query.has_joins_or_limit() {
            return self.compile_update_with_joins(query, table, columns, wheres);
        }
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
        _wheres: &str,
    ) -> Result<String> {
        Ok(format!(
            "update {table} set {columns} where {}",
            row_identifier_filter(self, query, "rowid")?
        ))
    }

    fn compile_delete_without_joins(
        &self,
        query: &QueryState,
        table: &str,
        wheres: &str,
    ) -> Result<String> {
        if query.has_joins_or_limit() {
            return self.compile_delete_with_joins(query, table, wheres);
        }
        Ok(concatenate([format!("delete from {table}"), wheres.to_owned()]))
    }

    fn compile_delete_with_joins(
        &self,
        query: &QueryState,
        table: &str,
        _wheres: &str,
    ) -> Result<String> {
        Ok(format!(
            "delete from {table} where {}",
            row_identifier_filter(self, query, "rowid")?
        ))
    }

    /// Clears the table and resets its autoincrement counter.
    fn compile_truncate(&self, query: &QueryState) -> Result<Vec<(String, Vec<Value>)>> {
        let name = match &query.from {
            Some(TableRef::Name(name)) => name,
            Some(_) => {
                return Err(GrammarError::invalid_option(
                    "truncate requires a plain table name",
                ))
            }
            None => return Err(missing_table()),
        };
        let table = split_alias(name).map_or(name.as_str(), |(table, _)| table);
        Ok(vec![
            (
                String::from("delete from sqlite_sequence where name = ?"),
                vec![Value::Text(format!("{}{table}", self.config.table_prefix))],
            ),
            (format!("delete from {}", self.wrap_table(table)), Vec::new()),
        ])
    }

    fn prepare_bindings_for_update(
        &self,
        query: &QueryState,
        bindings: &BindingBag,
        values: &Record,
    ) -> Vec<Value> {
        let mut update: Vec<Value> = values
            .iter()
            .filter(|(key, _)| !json::is_selector(key))
            .map(|(_, value)| match value {
                Value::Json(_) => value.to_json_text(),
                _ => value.clone(),
            })
            .collect();
        update.extend(
            json_update_groups(values)
                .into_iter()
                .map(|(_, document)| Value::Text(document.to_string())),
        );
        bindings.for_update(
            &[BindingKind::From],
            update,
            postgres::row_identifier_buckets(query),
        )
    }

    fn prepare_bindings_for_delete(&self, query: &QueryState, bindings: &BindingBag) -> Vec<Value> {
        postgres::row_identifier_delete_bindings(query, bindings)
    }
}
