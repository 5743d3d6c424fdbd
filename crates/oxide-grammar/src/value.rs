//! Bindable values.
//!
//! Every value that ends up in a compiled statement is either bound through a
//! `?` placeholder or, for [`Value::Raw`], inlined into the SQL text verbatim.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A value that can be bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Pre-escaped SQL fragment, inlined into the statement and never bound.
    ///
    /// **Warning**: nothing is escaped. Only use this for SQL that does not
    /// contain user input.
    Raw(#[serde(with = "raw_marker")] String),
    /// A JSON document (arrays and objects used with JSON columns).
    Json(serde_json::Value),
}

impl Value {
    /// Creates a raw expression marker.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Returns true for raw expression markers.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Returns the inlined SQL of a raw expression marker.
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(sql) => Some(sql),
            _ => None,
        }
    }

    /// Converts the value into a JSON document.
    ///
    /// Raw markers become JSON strings holding their SQL.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Text(s) | Self::Raw(s) => serde_json::Value::String(s.clone()),
            Self::Json(v) => v.clone(),
        }
    }

    /// Returns the JSON encoding of the value as a text binding.
    #[must_use]
    pub fn to_json_text(&self) -> Self {
        Self::Text(self.to_json().to_string())
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_text(s),
            Self::Raw(sql) => sql.clone(),
            Self::Json(v) => quote_text(&v.to_string()),
        }
    }
}

fn quote_text(s: &str) -> String {
    // Escape single quotes by doubling them
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

mod raw_marker {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Marker {
        raw: String,
    }

    pub fn serialize<S: Serializer>(sql: &str, serializer: S) -> Result<S::Ok, S::Error> {
        Marker {
            raw: sql.to_owned(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Marker::deserialize(deserializer).map(|marker| marker.raw)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `Value`.
    fn to_sql_value(self) -> Value;
}

impl ToSqlValue for Value {
    fn to_sql_value(self) -> Value {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> Value {
        match self {
            Some(v) => v.to_sql_value(),
            None => Value::Null,
        }
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> Value {
        Value::Json(self)
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> Value {
        Value::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(self) -> Value {
        Value::Text(self.format("%H:%M:%S").to_string())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> Value {
        Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_null() {
        assert_eq!(Value::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(Value::Text(String::from("it's")).to_sql_inline(), "'it''s'");
        assert_eq!(
            Value::Text(String::from("'; DROP TABLE users; --")).to_sql_inline(),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_raw_is_inlined_verbatim() {
        let value = Value::raw("now()");
        assert!(value.is_raw());
        assert_eq!(value.as_raw(), Some("now()"));
        assert_eq!(value.to_sql_inline(), "now()");
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), Value::Bool(true));
        assert_eq!(42_i32.to_sql_value(), Value::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), Value::Float(2.5));
        assert_eq!("hello".to_sql_value(), Value::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_sql_value(), Value::Null);
        assert_eq!(Some(42_i32).to_sql_value(), Value::Int(42));
    }

    #[test]
    fn test_chrono_conversions() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date.to_sql_value(), Value::Text(String::from("2024-03-09")));
        let stamp = date.and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(
            stamp.to_sql_value(),
            Value::Text(String::from("2024-03-09 07:05:00"))
        );
    }

    #[test]
    fn test_json_text_encoding() {
        assert_eq!(
            Value::Text(String::from("foo")).to_json_text(),
            Value::Text(String::from("\"foo\""))
        );
        assert_eq!(Value::Bool(true).to_json_text(), Value::Text(String::from("true")));
        let doc = serde_json::json!({"a": [1, 2]});
        assert_eq!(
            Value::Json(doc).to_json_text(),
            Value::Text(String::from("{\"a\":[1,2]}"))
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 1.5, "x", {"raw": "now()"}, [1]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(1.5),
                Value::Text(String::from("x")),
                Value::raw("now()"),
                Value::Json(serde_json::json!([1])),
            ]
        );
    }
}
