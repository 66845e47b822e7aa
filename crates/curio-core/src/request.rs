//! Entry-boundary checks run before any upstream fetch.

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{CriteriaValue, SearchCriteria};
use crate::normalize::scalar_text;

/// The only method accepted by the search endpoint.
pub const SEARCH_METHOD: &str = "POST";

/// Rejects any request method other than `POST`.
pub fn ensure_search_method(method: &str) -> Result<(), AppError> {
    if method == SEARCH_METHOD {
        Ok(())
    } else {
        Err(AppError::UnsupportedMethod(method.to_string()))
    }
}

impl SearchCriteria {
    /// Parses a raw JSON request body.
    ///
    /// ```
    /// use curio_core::SearchCriteria;
    ///
    /// let criteria = SearchCriteria::from_body(r#"{"keyword": "sunflower", "hasimage": 1}"#).unwrap();
    /// assert_eq!(criteria.keyword.as_deref(), Some("sunflower"));
    /// assert!(criteria.has_image);
    /// ```
    pub fn from_body(body: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AppError::InvalidRequest(format!("Malformed JSON body: {}", e)))?;
        Self::from_value(&value)
    }

    /// Builds criteria from an already-parsed request body.
    pub fn from_value(value: &Value) -> Result<Self, AppError> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::InvalidRequest("Request body must be a JSON object".to_string()))?;

        Ok(Self {
            keyword: text_field(object, "keyword")?,
            title: text_field(object, "title")?,
            has_image: flag_field(object, "hasimage")?,
            location: criteria_field(object, "location")?,
            classification: criteria_field(object, "classification")?,
            medium: criteria_field(object, "medium")?,
        })
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, AppError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => scalar_text(Some(raw))
            .map(Some)
            .ok_or_else(|| AppError::InvalidRequest(format!("'{}' must be a string", key))),
    }
}

/// Accepts integers, booleans and numeric strings; non-zero means true.
fn flag_field(object: &Map<String, Value>, key: &str) -> Result<bool, AppError> {
    let invalid = || AppError::InvalidRequest(format!("'{}' must be 0 or 1", key));
    match object.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(number)) => number.as_i64().map(|n| n != 0).ok_or_else(invalid),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn criteria_field(
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<CriteriaValue>, AppError> {
    let invalid = || AppError::InvalidRequest(format!("'{}' must be a string or a list of strings", key));
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| scalar_text(Some(entry)).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(|values| Some(CriteriaValue::List(values))),
        Some(raw) => scalar_text(Some(raw))
            .map(|text| Some(CriteriaValue::Text(text)))
            .ok_or_else(invalid),
    }
}
