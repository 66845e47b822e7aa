//! Translation of [`SearchCriteria`] into each upstream's query vocabulary.
//!
//! | criteria         | Harvard        | MET              |
//! |------------------|----------------|------------------|
//! | `keyword`        | `q`            | `q`              |
//! | `medium`         | `medium` (`any` when empty) | `medium` |
//! | `has_image`      | `hasimage=0/1` | `hasImages=true/false` |
//! | `location`       | `geoLocation`  | `place`          |
//! | `classification` | not sent       | `classification` |
//! | `title`          | `title`        | `title`          |
//!
//! Parameter order is fixed as listed. The output is either empty or a
//! `?`-prefixed query suffix.

use url::form_urlencoded;

use crate::models::{CriteriaValue, SearchCriteria};

/// Harvard has no "match everything" omission for medium; it expects `any`.
const HARVARD_DEFAULT_MEDIUM: &str = "any";

/// Query suffixes for both upstreams, built from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedQueries {
    pub harvard: String,
    pub met: String,
}

/// Builds both query suffixes for a search.
pub fn translate(criteria: &SearchCriteria) -> TranslatedQueries {
    TranslatedQueries {
        harvard: harvard_query(criteria),
        met: met_query(criteria),
    }
}

/// Builds the query suffix for the Harvard `object` endpoint (without the API key).
pub fn harvard_query(criteria: &SearchCriteria) -> String {
    let mut params = QueryParams::default();

    params.push_text("q", criteria.keyword.as_deref());
    params.push_value_or("medium", criteria.medium.as_ref(), HARVARD_DEFAULT_MEDIUM);
    params.push_raw("hasimage", if criteria.has_image { "1" } else { "0" });
    params.push_value("geoLocation", criteria.location.as_ref());
    params.push_text("title", criteria.title.as_deref());

    params.finish()
}

/// Builds the query suffix for the MET `search` endpoint.
pub fn met_query(criteria: &SearchCriteria) -> String {
    let mut params = QueryParams::default();

    params.push_text("q", criteria.keyword.as_deref());
    params.push_value("medium", criteria.medium.as_ref());
    params.push_raw("hasImages", if criteria.has_image { "true" } else { "false" });
    params.push_value("place", criteria.location.as_ref());
    params.push_value("classification", criteria.classification.as_ref());
    params.push_text("title", criteria.title.as_deref());

    params.finish()
}

/// URL-encodes one value with form encoding (spaces become `+`).
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Default)]
struct QueryParams {
    pairs: Vec<String>,
}

impl QueryParams {
    fn push_raw(&mut self, key: &str, value: &str) {
        self.pairs.push(format!("{}={}", key, value));
    }

    fn push_text(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.push_raw(key, &encode_component(value));
        }
    }

    fn push_value(&mut self, key: &str, value: Option<&CriteriaValue>) {
        if let Some(joined) = value.and_then(join_values) {
            self.push_raw(key, &joined);
        }
    }

    fn push_value_or(&mut self, key: &str, value: Option<&CriteriaValue>, default: &str) {
        match value.and_then(join_values) {
            Some(joined) => self.push_raw(key, &joined),
            None => self.push_raw(key, default),
        }
    }

    fn finish(self) -> String {
        if self.pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", self.pairs.join("&"))
        }
    }
}

/// Encodes each non-blank value and joins them with `|`.
fn join_values(value: &CriteriaValue) -> Option<String> {
    let values = value.values();
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .into_iter()
            .map(encode_component)
            .collect::<Vec<_>>()
            .join("|"),
    )
}
