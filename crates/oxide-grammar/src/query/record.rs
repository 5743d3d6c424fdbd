//! Row payloads for INSERT, UPDATE and upsert statements.

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, Result};
use crate::value::{ToSqlValue, Value};

/// An ordered set of column/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, keeping the position of an existing entry.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl ToSqlValue) -> Self {
        let value = value.to_sql_value();
        match self.entries.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.to_owned(), value)),
        }
        self
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record holds no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the record holds exactly the given column set.
    fn has_columns(&self, columns: &[&str]) -> bool {
        self.len() == columns.len() && columns.iter().all(|column| self.get(column).is_some())
    }
}

impl<K: Into<String>, V: ToSqlValue> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |record, (column, value)| {
                record.set(&column.into(), value)
            })
    }
}

/// Rows of an INSERT statement.
///
/// A single record is handled as a one-element batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertValues {
    /// One row.
    Single(Record),
    /// Several rows sharing the same column set.
    Batch(Vec<Record>),
}

impl InsertValues {
    /// The rows as a slice.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Single(record) => std::slice::from_ref(record),
            Self::Batch(records) => records,
        }
    }

    /// Returns true if there is nothing to insert but default values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().iter().all(Record::is_empty)
    }

    /// Column names of the batch, in the order of the first row.
    ///
    /// Fails when rows disagree on their column set.
    pub fn columns(&self) -> Result<Vec<&str>> {
        let records = self.records();
        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };
        let columns: Vec<&str> = first.columns().collect();
        if records.iter().any(|record| !record.has_columns(&columns)) {
            return Err(GrammarError::malformed(
                "insert records have different column sets",
            ));
        }
        Ok(columns)
    }

    /// Values of every row in `columns` order, row after row.
    pub fn values_in<'a>(&'a self, columns: &'a [&'a str]) -> impl Iterator<Item = &'a Value> {
        self.records().iter().flat_map(move |record| {
            columns
                .iter()
                .filter_map(move |column| record.get(column))
        })
    }
}

impl From<Record> for InsertValues {
    fn from(record: Record) -> Self {
        Self::Single(record)
    }
}

impl From<Vec<Record>> for InsertValues {
    fn from(records: Vec<Record>) -> Self {
        Self::Batch(records)
    }
}

/// What an upsert writes into a row that already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpsertColumn {
    /// Overwrite with the incoming value of the column.
    Column(String),
    /// Overwrite with an explicit value.
    Value(String, Value),
}
