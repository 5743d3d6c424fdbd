//! PostgreSQL grammar.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::{json, reject_unrendered_clauses, row_identifier_filter, Grammar};
use crate::config::GrammarConfig;
use crate::error::{GrammarError, Result};
use crate::query::{
    BindingBag, BindingKind, ColumnExpr, DatePart, Distinct, FullTextOptions, InsertValues, Join, Lock,
    QueryState, Record, UpsertColumn,
};
use crate::value::Value;

static TRAILING_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(-?[0-9]+)\]$").expect("valid index pattern"));

/// Text search configurations shipped with PostgreSQL.
const FULL_TEXT_LANGUAGES: &[&str] = &[
    "simple",
    "arabic",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "hungarian",
    "indonesian",
    "irish",
    "italian",
    "lithuanian",
    "nepali",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "tamil",
    "turkish",
];

/// PostgreSQL grammar.
#[derive(Debug, Default, Clone)]
pub struct PostgresGrammar {
    config: GrammarConfig,
}

impl PostgresGrammar {
    /// Creates a PostgreSQL grammar with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a PostgreSQL grammar with the given configuration.
    #[must_use]
    pub const fn with_config(config: GrammarConfig) -> Self {
        Self { config }
    }

    /// Selector keeping the JSON type of the last step (`->` instead of
    /// `->>`), used wherever the result is cast to `jsonb`.
    fn wrap_json_document(&self, value: &str) -> Result<String> {
        Ok(self.wrap(value)?.replace("->>", "->"))
    }

    fn full_text_language<'a>(&self, options: &'a FullTextOptions) -> &'a str {
        match options.language.as_deref() {
            None => "english",
            Some(language) if FULL_TEXT_LANGUAGES.contains(&language) => language,
            Some(language) => {
                warn!(language, "unknown text search configuration, using english");
                "english"
            }
        }
    }

    /// `field = jsonb_set(field::jsonb, '{"a","b"}', ?)`
    fn compile_json_update_column(&self, key: &str, value: &Value) -> Result<String> {
        let mut segments = key.split("->");
        let field = self.wrap(segments.next().unwrap_or_default())?;
        let segments: Vec<&str> = segments.collect();
        let path = json::wrap_path_attributes(&segments, "\"").join(",");
        Ok(format!(
            "{field} = jsonb_set({field}::jsonb, '{{{path}}}', {})",
            self.parameter(value)
        ))
    }
}

impl Grammar for PostgresGrammar {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn config(&self) -> &GrammarConfig {
        &self.config
    }

    fn compile_columns(&self, query: &QueryState, columns: &[ColumnExpr]) -> Result<String> {
        let select = match &query.distinct {
            Distinct::On(on) => format!("select distinct on ({}) ", self.columnize(on)?),
            Distinct::All => String::from("select distinct "),
            Distinct::Off => String::from("select "),
        };
        Ok(format!("{select}{}", self.columnize(columns)?))
    }

    fn compile_lock(&self, _query: &QueryState, lock: &Lock) -> String {
        match lock {
            Lock::Exclusive => String::from("for update"),
            Lock::Shared => String::from("for share"),
            Lock::Raw(sql) => sql.clone(),
        }
    }

    fn compile_join_lateral(&self, join: &Join, expression: &str) -> Result<String> {
        Ok(format!(
            "{} join lateral {expression} on true",
            join.kind.as_str()
        ))
    }

    fn where_basic(&self, column: &ColumnExpr, operator: &str, value: &Value) -> Result<String> {
        let mut lhs = self.wrap_column(column)?;
        if operator.to_ascii_lowercase().contains("like") {
            lhs.push_str("::text");
        }
        Ok(self.compile_comparison(&lhs, operator, &self.parameter(value)))
    }

    fn where_bitwise(&self, column: &ColumnExpr, operator: &str, value: &Value) -> Result<String> {
        Ok(format!(
            "({} {operator} {})::bool",
            self.wrap_column(column)?,
            self.parameter(value)
        ))
    }

    fn where_like(
        &self,
        column: &ColumnExpr,
        value: &Value,
        case_sensitive: bool,
        not: bool,
    ) -> Result<String> {
        let not = if not { "not " } else { "" };
        let like = if case_sensitive { "like" } else { "ilike" };
        self.where_basic(column, &format!("{not}{like}"), value)
    }

    fn where_date(
        &self,
        part: DatePart,
        column: &ColumnExpr,
        operator: &str,
        value: &Value,
    ) -> Result<String> {
        let column = self.wrap_column(column)?;
        let value = self.parameter(value);
        Ok(match part {
            DatePart::Date => format!("{column}::date {operator} {value}"),
            DatePart::Time => format!("{column}::time {operator} {value}"),
            DatePart::Day | DatePart::Month | DatePart::Year => {
                format!("extract({} from {column}) {operator} {value}", part.as_str())
            }
        })
    }

    fn where_full_text(
        &self,
        columns: &[ColumnExpr],
        value: &Value,
        options: &FullTextOptions,
    ) -> Result<String> {
        let language = self.full_text_language(options);
        let vectors = columns
            .iter()
            .map(|column| {
                Ok(format!(
                    "to_tsvector('{language}', {})",
                    self.wrap_column(column)?
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .join(" || ");
        let function = match options.mode.as_deref() {
            Some("phrase") => "phraseto_tsquery",
            Some("websearch") => "websearch_to_tsquery",
            _ => "plainto_tsquery",
        };
        Ok(format!(
            "({vectors}) @@ {function}('{language}', {})",
            self.parameter(value)
        ))
    }

    fn wrap_json_selector(&self, value: &str) -> Result<String> {
        let mut path = value.split("->");
        let field = self.wrap_segments(path.next().unwrap_or_default());
        let segments: Vec<&str> = path.collect();
        let mut attributes = json::wrap_path_attributes(&segments, "'");
        let Some(last) = attributes.pop() else {
            return Ok(field);
        };
        if attributes.is_empty() {
            return Ok(format!("{field}->>{last}"));
        }
        Ok(format!("{field}->{}->>{last}", attributes.join("->")))
    }

    fn wrap_json_boolean_selector(&self, value: &str) -> Result<String> {
        Ok(format!(
            "({})::jsonb",
            self.wrap_json_selector(value)?.replace("->>", "->")
        ))
    }

    fn wrap_json_boolean_value(&self, value: &str) -> String {
        format!("'{value}'::jsonb")
    }

    fn compile_json_contains(&self, column: &str, value: &str) -> Result<String> {
        Ok(format!(
            "({})::jsonb @> {value}",
            self.wrap_json_document(column)?
        ))
    }

    fn compile_json_contains_key(&self, column: &str) -> Result<String> {
        let mut segments: Vec<&str> = column.split("->").collect();
        let last = segments.pop().unwrap_or_default();
        let mut index: Option<i64> = last.parse().ok();
        if index.is_none() {
            if let Some(caps) = TRAILING_INDEX.captures(last) {
                let whole = caps.get(0).map_or(0, |m| m.start());
                segments.push(&last[..whole]);
                index = caps[1].parse().ok();
            }
        }
        let column = self.wrap_json_document(&segments.join("->"))?;
        match index {
            Some(i) => {
                let comparison = if i < 0 {
                    format!(">= {}", i.unsigned_abs())
                } else {
                    format!("> {i}")
                };
                Ok(format!(
                    "case when jsonb_typeof(({column})::jsonb) = 'array' then jsonb_array_length(({column})::jsonb) {comparison} else false end"
                ))
            }
            None => Ok(format!(
                "coalesce(({column})::jsonb ?? '{}', false)",
                last.replace('\'', "''")
            )),
        }
    }

    fn compile_json_length(&self, column: &str, operator: &str, value: &str) -> Result<String> {
        Ok(format!(
            "jsonb_array_length(({})::jsonb) {operator} {value}",
            self.wrap_json_document(column)?
        ))
    }

    fn compile_insert_or_ignore(&self, query: &QueryState, values: &InsertValues) -> Result<String> {
        Ok(format!(
            "{} on conflict do nothing",
            self.compile_insert(query, values)?
        ))
    }

    fn compile_insert_get_id(
        &self,
        query: &QueryState,
        values: &InsertValues,
        sequence: Option<&str>,
    ) -> Result<String> {
        Ok(format!(
            "{} returning {}",
            self.compile_insert(query, values)?,
            self.wrap(sequence.unwrap_or("id"))?
        ))
    }

    fn compile_upsert(
        &self,
        query: &QueryState,
        values: &InsertValues,
        unique_by: &[String],
        update: &[UpsertColumn],
    ) -> Result<String> {
        compile_conflict_upsert(self, query, values, unique_by, update)
    }

    fn validate_write(&self, query: &QueryState, statement: &str) -> Result<()> {
        validate_row_identifier_write(self, query, statement)
    }

    fn compile_update_columns(&self, _query: &QueryState, values: &Record) -> Result<String> {
        Ok(values
            .iter()
            .map(|(key, value)| {
                let column = key.rsplit('.').next().unwrap_or(key);
                if json::is_selector(key) {
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
        if query.has_joins_or_limit() {
            return self.compile_update_with_joins(query, table, columns, wheres);
        }
        Ok(super::concatenate([
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
            row_identifier_filter(self, query, "ctid")?
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
        Ok(super::concatenate([
            format!("delete from {table}"),
            wheres.to_owned(),
        ]))
    }

    fn compile_delete_with_joins(
        &self,
        query: &QueryState,
        table: &str,
        _wheres: &str,
    ) -> Result<String> {
        Ok(format!(
            "delete from {table} where {}",
            row_identifier_filter(self, query, "ctid")?
        ))
    }

    fn compile_truncate(&self, query: &QueryState) -> Result<Vec<(String, Vec<Value>)>> {
        let cascade = if self.config.cascade_truncate {
            " cascade"
        } else {
            ""
        };
        Ok(vec![(
            format!(
                "truncate {} restart identity{cascade}",
                self.compile_write_table(query)?
            ),
            Vec::new(),
        )])
    }

    fn prepare_bindings_for_update(
        &self,
        query: &QueryState,
        bindings: &BindingBag,
        values: &Record,
    ) -> Vec<Value> {
        let values = values
            .iter()
            .map(|(column, value)| match value {
                Value::Json(_) => value.to_json_text(),
                _ if json::is_selector(column) && !value.is_raw() => value.to_json_text(),
                _ => value.clone(),
            })
            .collect();
        bindings.for_update(&[BindingKind::From], values, row_identifier_buckets(query))
    }

    fn prepare_bindings_for_delete(&self, query: &QueryState, bindings: &BindingBag) -> Vec<Value> {
        row_identifier_delete_bindings(query, bindings)
    }
}

/// Joins and limits go through the row-identifier sub-select, which renders
/// every clause but unions; without them only the WHERE clause renders.
pub(super) fn validate_row_identifier_write<G: Grammar + ?Sized>(
    grammar: &G,
    query: &QueryState,
    statement: &str,
) -> Result<()> {
    if query.has_joins_or_limit() && query.unions.is_empty() {
        return Ok(());
    }
    reject_unrendered_clauses(grammar, query, statement, false)
}

/// Buckets rendered after the SET clause of an UPDATE, or after the table of
/// a DELETE, on dialects rewriting through a row identifier.
pub(super) fn row_identifier_buckets(query: &QueryState) -> &'static [BindingKind] {
    if query.has_joins_or_limit() {
        &BindingKind::QUERY
    } else {
        &[BindingKind::Where]
    }
}

pub(super) fn row_identifier_delete_bindings(
    query: &QueryState,
    bindings: &BindingBag,
) -> Vec<Value> {
    let mut values = bindings.flatten_only(&[BindingKind::From]);
    values.extend(bindings.flatten_only(row_identifier_buckets(query)));
    values
}

/// `insert ... on conflict (keys) do update set ...`, shared with SQLite.
pub(super) fn compile_conflict_upsert<G: Grammar + ?Sized>(
    grammar: &G,
    query: &QueryState,
    values: &InsertValues,
    unique_by: &[String],
    update: &[UpsertColumn],
) -> Result<String> {
    if unique_by.is_empty() {
        return Err(GrammarError::invalid_option(
            "upsert requires at least one unique column",
        ));
    }
    let keys = unique_by
        .iter()
        .map(|column| grammar.wrap(column))
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    let columns = update
        .iter()
        .map(|column| {
            Ok(match column {
                UpsertColumn::Column(name) => format!(
                    "{} = {}.{}",
                    grammar.wrap(name)?,
                    grammar.wrap_value("excluded"),
                    grammar.wrap_value(name)
                ),
                UpsertColumn::Value(name, value) => {
                    format!("{} = {}", grammar.wrap(name)?, grammar.parameter(value))
                }
            })
        })
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(format!(
        "{} on conflict ({keys}) do update set {columns}",
        grammar.compile_insert(query, values)?
    ))
}
