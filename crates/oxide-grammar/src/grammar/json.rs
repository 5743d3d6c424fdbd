//! JSON selector helpers.
//!
//! A selector is a column followed by `->`-separated path segments, for
//! example `options->languages[0]->name`. Segments may end in one or more
//! bracketed array indices.

use std::sync::LazyLock;

use regex::Regex;

static ARRAY_KEYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[[^\]]+\])+$").expect("valid array key pattern"));

static ARRAY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid array key pattern"));

static ESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\+)?'").expect("valid quote pattern"));

/// Returns true if the value addresses a path inside a JSON column.
#[must_use]
pub fn is_selector(value: &str) -> bool {
    value.contains("->")
}

/// Splits a selector into its column and the path that follows the first
/// `->`.
#[must_use]
pub fn split_selector(value: &str) -> (&str, &str) {
    value.split_once("->").unwrap_or((value, ""))
}

/// Renders a path as a quoted JSON path literal: `'$."a"."b"[0]'`.
///
/// Single quotes are doubled, swallowing any backslashes that precede them.
#[must_use]
pub fn wrap_path(value: &str, delimiter: &str) -> String {
    let value = ESCAPED_QUOTE.replace_all(value, "''");
    let path = value
        .split(delimiter)
        .map(wrap_path_segment)
        .collect::<Vec<_>>()
        .join(".");
    let separator = if path.starts_with('[') { "" } else { "." };
    format!("'${separator}{path}'")
}

fn wrap_path_segment(segment: &str) -> String {
    match ARRAY_KEYS.find(segment) {
        Some(indices) => {
            let key = &segment[..indices.start()];
            if key.is_empty() {
                indices.as_str().to_owned()
            } else {
                format!("\"{key}\"{}", indices.as_str())
            }
        }
        None => format!("\"{segment}\""),
    }
}

/// Splits a segment with trailing array indices into its parts:
/// `items[0][1]` becomes `["items", "0", "1"]`.
#[must_use]
pub fn parse_array_keys(segment: &str) -> Vec<String> {
    let Some(indices) = ARRAY_KEYS.find(segment) else {
        return vec![segment.to_owned()];
    };
    let key = &segment[..indices.start()];
    let mut parts = Vec::new();
    if !key.is_empty() {
        parts.push(key.to_owned());
    }
    parts.extend(
        ARRAY_KEY
            .captures_iter(indices.as_str())
            .map(|caps| caps[1].to_owned()),
    );
    parts
}

/// Expands path segments into attributes, quoting every attribute that is
/// not an integer with `quote`.
#[must_use]
pub fn wrap_path_attributes(segments: &[&str], quote: &str) -> Vec<String> {
    segments
        .iter()
        .flat_map(|segment| parse_array_keys(segment))
        .filter(|attribute| !attribute.is_empty())
        .map(|attribute| {
            if attribute.parse::<i64>().is_ok() {
                attribute
            } else {
                format!("{quote}{attribute}{quote}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_path() {
        assert_eq!(wrap_path("language", "->"), r#"'$."language"'"#);
        assert_eq!(wrap_path("a->b", "->"), r#"'$."a"."b"'"#);
        assert_eq!(wrap_path("items[0]->name", "->"), r#"'$."items"[0]."name"'"#);
        assert_eq!(wrap_path("[1]", "->"), "'$[1]'");
    }

    #[test]
    fn test_wrap_path_escapes_quotes() {
        assert_eq!(wrap_path("it's", "->"), r#"'$."it''s"'"#);
        assert_eq!(wrap_path(r"it\'s", "->"), r#"'$."it''s"'"#);
    }

    #[test]
    fn test_split_selector() {
        assert_eq!(split_selector("options->a->b"), ("options", "a->b"));
        assert_eq!(split_selector("options"), ("options", ""));
    }

    #[test]
    fn test_parse_array_keys() {
        assert_eq!(parse_array_keys("items[0][1]"), vec!["items", "0", "1"]);
        assert_eq!(parse_array_keys("[2]"), vec!["2"]);
        assert_eq!(parse_array_keys("name"), vec!["name"]);
    }

    #[test]
    fn test_wrap_path_attributes() {
        assert_eq!(
            wrap_path_attributes(&["tags[1]", "name"], "'"),
            vec!["'tags'", "1", "'name'"]
        );
    }
}
