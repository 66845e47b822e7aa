//! Source-independent normalization rules.
//!
//! This module holds the pure field-level rules used when mapping upstream
//! records into [`Item`](crate::models::Item): century labels, identifier
//! parsing, and blank-string handling. Source-specific record shapes live with
//! their HTTP clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const UNKNOWN_CENTURY: &str = "Unknown Century";
pub const INVALID_YEAR: &str = "Invalid Year";

/// Derives a century label from a display date.
///
/// Only four-character dates are understood; the first two characters are the
/// zero-based century index.
///
/// # Examples
///
/// ```
/// use curio_core::normalize::century_label;
///
/// assert_eq!(century_label(Some("1889")), "19th Century");
/// assert_eq!(century_label(Some("2001")), "21st Century");
/// assert_eq!(century_label(Some("")), "Unknown Century");
/// assert_eq!(century_label(Some("18")), "Invalid Year");
/// ```
pub fn century_label(display_date: Option<&str>) -> String {
    let date = match display_date {
        Some(date) if !date.is_empty() => date,
        _ => return UNKNOWN_CENTURY.to_string(),
    };

    if date.chars().count() != 4 {
        return INVALID_YEAR.to_string();
    }

    let prefix: String = date.chars().take(2).collect();
    let Ok(index) = prefix.parse::<i32>() else {
        return INVALID_YEAR.to_string();
    };

    let century = index + 1;
    format!("{}{} Century", century, ordinal_suffix(century))
}

/// English ordinal suffix: 11-13 take "th", otherwise by last digit.
pub fn ordinal_suffix(n: i32) -> &'static str {
    let last_two = n % 100;
    if (11..=13).contains(&last_two) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Reads a numeric identifier from a raw JSON field.
///
/// Accepts integers, integral floats and numeric strings. Anything else
/// (absent, null, text, fractions) yields `None`; callers must drop the
/// record rather than substitute a placeholder.
pub fn parse_identifier(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Treats empty strings as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Renders a scalar JSON value as text; `null` and containers yield `None`.
pub fn scalar_text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Serde adapter for loosely typed upstream text fields.
///
/// Use with `#[serde(default, deserialize_with = "lenient_text")]` so a field
/// holding a number, a container, or `null` never fails the whole record.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(scalar_text(raw.as_ref()))
}

/// Serde adapter for loosely typed upstream arrays of objects.
///
/// A value that is not an array yields `None`; entries that are not objects
/// or do not fit `T` are dropped. An optional array never fails the record.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries,
        _ => return Ok(None),
    };
    Ok(Some(
        entries
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_century_examples() {
        assert_eq!(century_label(Some("1889")), "19th Century");
        assert_eq!(century_label(Some("2001")), "21st Century");
        assert_eq!(century_label(Some("1500")), "16th Century");
        assert_eq!(century_label(Some("0150")), "2nd Century");
        assert_eq!(century_label(Some("0250")), "3rd Century");
    }

    #[test]
    fn test_century_unknown() {
        assert_eq!(century_label(None), UNKNOWN_CENTURY);
        assert_eq!(century_label(Some("")), UNKNOWN_CENTURY);
    }

    #[test]
    fn test_century_invalid() {
        assert_eq!(century_label(Some("18")), INVALID_YEAR);
        assert_eq!(century_label(Some("ca. 1889")), INVALID_YEAR);
        assert_eq!(century_label(Some("1880s")), INVALID_YEAR);
        assert_eq!(century_label(Some("ab12")), INVALID_YEAR);
    }

    #[test]
    fn test_century_teens_take_th() {
        assert_eq!(century_label(Some("1050")), "11th Century");
        assert_eq!(century_label(Some("1150")), "12th Century");
        assert_eq!(century_label(Some("1250")), "13th Century");
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(111), "th");
        assert_eq!(ordinal_suffix(121), "st");
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier(Some(&json!(436524))), Some(436524));
        assert_eq!(parse_identifier(Some(&json!("299843"))), Some(299843));
        assert_eq!(parse_identifier(Some(&json!(12.0))), Some(12));
        assert_eq!(parse_identifier(Some(&json!(12.5))), None);
        assert_eq!(parse_identifier(Some(&json!("abc"))), None);
        assert_eq!(parse_identifier(Some(&Value::Null)), None);
        assert_eq!(parse_identifier(None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(Some(&json!("Dutch"))), Some("Dutch".to_string()));
        assert_eq!(scalar_text(Some(&json!(19))), Some("19".to_string()));
        assert_eq!(scalar_text(Some(&json!(null))), None);
        assert_eq!(scalar_text(Some(&json!(["a"]))), None);
    }

    #[test]
    fn test_lenient_text_field() {
        #[derive(serde::Deserialize)]
        struct Raw {
            #[serde(default, deserialize_with = "lenient_text")]
            century: Option<String>,
        }

        let raw: Raw = serde_json::from_value(json!({"century": "19th century"})).unwrap();
        assert_eq!(raw.century.as_deref(), Some("19th century"));

        let raw: Raw = serde_json::from_value(json!({"century": {"nested": true}})).unwrap();
        assert_eq!(raw.century, None);

        let raw: Raw = serde_json::from_value(json!({})).unwrap();
        assert_eq!(raw.century, None);
    }

    #[test]
    fn test_lenient_list_field() {
        #[derive(serde::Deserialize, Debug)]
        struct Person {
            #[serde(default, deserialize_with = "lenient_text")]
            name: Option<String>,
        }

        #[derive(serde::Deserialize)]
        struct Raw {
            #[serde(default, deserialize_with = "lenient_list")]
            people: Option<Vec<Person>>,
        }

        let raw: Raw = serde_json::from_value(json!({"people": "none"})).unwrap();
        assert!(raw.people.is_none());

        let raw: Raw = serde_json::from_value(json!({"people": {"name": "x"}})).unwrap();
        assert!(raw.people.is_none());

        let raw: Raw =
            serde_json::from_value(json!({"people": [null, 3, {"name": "Hokusai"}]})).unwrap();
        let people = raw.people.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name.as_deref(), Some("Hokusai"));

        let raw: Raw = serde_json::from_value(json!({})).unwrap();
        assert!(raw.people.is_none());
    }
}
