//! Domain models shared by every Curio component.

use serde::{Deserialize, Serialize};

/// A collection object normalized from either upstream museum API.
///
/// The JSON field names are the wire shape consumed by existing clients and
/// must not change. Absent optional values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub credit_line: Option<String>,
    /// Harvard `division` or MET `department`.
    pub article_division: Option<String>,
    /// Source-scoped identifier; Harvard and MET ids may collide.
    pub article_id: i64,
    /// Harvard `classification` or MET `objectName`.
    pub article_classification: Option<String>,
    pub image_url: Option<String>,
    pub artist_name: Option<String>,
    /// Medium or technique, free text.
    pub technique: Option<String>,
    pub title: Option<String>,
    /// Display date as published by the source, never parsed.
    pub date: Option<String>,
    #[serde(rename = "ItemURL")]
    pub item_url: Option<String>,
    pub century: String,
    pub artist_nationality: Option<String>,
}

/// A criteria field that accepts either one value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriteriaValue {
    Text(String),
    List(Vec<String>),
}

impl CriteriaValue {
    /// Returns the non-blank values in order.
    pub fn values(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            CriteriaValue::Text(text) => vec![text.as_str()],
            CriteriaValue::List(items) => items.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .filter(|value| !value.trim().is_empty())
            .collect()
    }

    /// A value is empty when it is a blank string, an empty list, or a list of
    /// blank strings.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        CriteriaValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for CriteriaValue {
    fn from(values: Vec<String>) -> Self {
        CriteriaValue::List(values)
    }
}

/// Search criteria built once per incoming request and consumed by the
/// query translator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub keyword: Option<String>,
    pub title: Option<String>,
    pub has_image: bool,
    pub location: Option<CriteriaValue>,
    pub classification: Option<CriteriaValue>,
    pub medium: Option<CriteriaValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            credit_line: Some("Gift of the artist".to_string()),
            article_division: Some("European Paintings".to_string()),
            article_id: 436524,
            article_classification: Some("Painting".to_string()),
            image_url: None,
            artist_name: Some("Vincent van Gogh".to_string()),
            technique: Some("Oil on canvas".to_string()),
            title: Some("Sunflowers".to_string()),
            date: Some("1887".to_string()),
            item_url: Some("https://www.metmuseum.org/art/collection/search/436524".to_string()),
            century: "19th Century".to_string(),
            artist_nationality: Some("Dutch".to_string()),
        }
    }

    #[test]
    fn test_item_serializes_wire_field_names() {
        let value = serde_json::to_value(sample_item()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "CreditLine",
            "ArticleDivision",
            "ArticleId",
            "ArticleClassification",
            "ImageUrl",
            "ArtistName",
            "Technique",
            "Title",
            "Date",
            "ItemURL",
            "Century",
            "ArtistNationality",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert_eq!(object.len(), 12);
        assert_eq!(value["ArticleId"], 436524);
        assert!(value["ImageUrl"].is_null());
    }

    #[test]
    fn test_criteria_value_drops_blank_entries() {
        let value = CriteriaValue::List(vec![
            "Oil".to_string(),
            "  ".to_string(),
            "Canvas".to_string(),
        ]);
        assert_eq!(value.values(), vec!["Oil", "Canvas"]);
        assert!(!value.is_empty());
    }

    #[test]
    fn test_criteria_value_empty_forms() {
        assert!(CriteriaValue::Text("   ".to_string()).is_empty());
        assert!(CriteriaValue::List(Vec::new()).is_empty());
        assert!(CriteriaValue::List(vec![String::new(), " ".to_string()]).is_empty());
        assert!(!CriteriaValue::from("Paintings").is_empty());
    }

    #[test]
    fn test_criteria_value_deserializes_text_or_list() {
        let text: CriteriaValue = serde_json::from_str(r#""France""#).unwrap();
        assert_eq!(text, CriteriaValue::Text("France".to_string()));

        let list: CriteriaValue = serde_json::from_str(r#"["France", "Spain"]"#).unwrap();
        assert_eq!(
            list,
            CriteriaValue::List(vec!["France".to_string(), "Spain".to_string()])
        );
    }
}
