use std::num::NonZeroU32;
use std::sync::Arc;

use curio_core::error::AppError;
use curio_core::models::Item;
use curio_core::normalize::{century_label, lenient_list, lenient_text, non_empty, parse_identifier};
use curio_core::report::{FetchOutcome, Source, SourceReport};
use futures::stream::{self, StreamExt};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::transport::{deadline_passed, with_deadline, JsonTransport};

/// Response of the MET `search` endpoint.
///
/// MET API reference: <https://metmuseum.github.io/>
///
/// `objectIDs` is `null` when nothing matches.
#[derive(Deserialize, Debug)]
struct MetSearchResponse {
    #[serde(rename = "objectIDs", default)]
    object_ids: Option<Vec<i64>>,
}

/// Data Transfer Object for the MET `objects/{id}` endpoint.
///
/// # Examples
///
/// ```
/// use curio_client::met::MetObject;
///
/// let json = r#"{
///     "objectID": 436524,
///     "title": "Sunflowers",
///     "objectDate": "1887",
///     "primaryImage": "",
///     "constituents": [{"name": "Vincent van Gogh"}]
/// }"#;
///
/// let object: MetObject = serde_json::from_str(json).unwrap();
/// let item = object.into_item().unwrap();
/// assert_eq!(item.century, "19th Century");
/// assert_eq!(item.image_url, None);
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetObject {
    #[serde(rename = "objectID", default)]
    pub object_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub credit_line: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub object_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub constituents: Option<Vec<MetConstituent>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub object_date: Option<String>,
    #[serde(rename = "objectURL", default, deserialize_with = "lenient_text")]
    pub object_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub artist_nationality: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MetConstituent {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

impl MetObject {
    /// Primary image, with an empty string treated as no image.
    pub fn image_url(&self) -> Option<String> {
        non_empty(self.primary_image.clone())
    }

    /// Name of the first constituent.
    pub fn artist_name(&self) -> Option<String> {
        self.constituents.as_ref()?.first()?.name.clone()
    }

    /// Converts the object into the shared `Item` model, deriving the century
    /// from `objectDate`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRecord` if `objectID` is absent or not numeric.
    pub fn into_item(self) -> Result<Item, AppError> {
        let article_id = parse_identifier(self.object_id.as_ref())
            .ok_or_else(|| AppError::InvalidRecord("MET object without a numeric objectID".to_string()))?;

        let image_url = self.image_url();
        let artist_name = self.artist_name();
        let century = century_label(self.object_date.as_deref());

        Ok(Item {
            credit_line: self.credit_line,
            article_division: self.department,
            article_id,
            article_classification: self.object_name,
            image_url,
            artist_name,
            technique: self.medium,
            title: self.title,
            date: self.object_date,
            item_url: self.object_url,
            century,
            artist_nationality: self.artist_nationality,
        })
    }
}

/// Client for the MET collection API: one search, then one request per object.
///
/// Object requests run through an ordered pipeline of `concurrency` in-flight
/// requests, paced by a shared rate limiter.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use curio_client::{MetClient, ReqwestTransport};
/// use curio_core::HttpConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(ReqwestTransport::new(&HttpConfig::default())?);
/// let client = MetClient::new(
///     transport,
///     "https://collectionapi.metmuseum.org/public/collection/v1/search",
///     "https://collectionapi.metmuseum.org/public/collection/v1/objects",
///     150,
/// )
/// .with_concurrency(4)
/// .with_rate_limit(20);
/// let report = client.fetch("?q=sunflower&hasImages=true", None).await;
/// println!("MET returned {} items", report.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MetClient {
    transport: Arc<dyn JsonTransport>,
    search_url: String,
    object_url: String,
    max_results: usize,
    concurrency: usize,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl MetClient {
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        search_url: &str,
        object_url: &str,
        max_results: usize,
    ) -> Self {
        Self {
            transport,
            search_url: search_url.to_string(),
            object_url: object_url.trim_end_matches('/').to_string(),
            max_results: max_results.max(1),
            concurrency: 1,
            rate_limiter: None,
        }
    }

    /// Sets how many object requests may be in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Caps object requests at `per_second`.
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        self.rate_limiter = Some(Arc::new(RateLimiter::direct(Quota::per_second(per_second))));
        self
    }

    pub fn search_url(&self, query: &str) -> Result<Url, AppError> {
        Url::parse(&format!("{}{}", self.search_url, query))
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", e, self.search_url)))
    }

    pub fn object_url(&self, id: i64) -> Result<Url, AppError> {
        Url::parse(&format!("{}/{}", self.object_url, id))
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", e, self.object_url)))
    }

    /// Searches, then fetches objects in identifier order until `max_results`
    /// items were normalized or the identifiers run out.
    ///
    /// A failed search yields an empty, failed report. A failed object request
    /// or an object without a numeric id skips that identifier only. When
    /// `deadline` passes, the items gathered so far are returned.
    pub async fn fetch(&self, query: &str, deadline: Option<Instant>) -> SourceReport {
        let url = match self.search_url(query) {
            Ok(url) => url,
            Err(e) => return self.failure(e),
        };

        info!(source = "MET", url = %url, "Requesting search");

        let ids = match with_deadline(deadline, self.search(&url)).await {
            Ok(ids) => ids,
            Err(AppError::DeadlineExceeded) => return self.deadline_expired(Vec::new(), 0),
            Err(e) => return self.failure(e),
        };

        info!(source = "MET", object_ids = ids.len(), "Object ids retrieved");

        let mut items = Vec::new();
        let mut skipped = 0;
        let mut outcome = FetchOutcome::Exhausted;

        let mut objects = stream::iter(ids)
            .map(|id| self.fetch_object(id, deadline))
            .buffered(self.concurrency);

        while let Some((id, result)) = objects.next().await {
            match result {
                Ok(item) => {
                    debug!(source = "MET", item_id = id, "Item formatted");
                    items.push(item);
                    if items.len() >= self.max_results {
                        outcome = FetchOutcome::CeilingReached;
                        break;
                    }
                }
                Err(AppError::DeadlineExceeded) => {
                    return self.deadline_expired(items, skipped);
                }
                Err(e) => {
                    warn!(source = "MET", item_id = id, error = %e, "Error calling object");
                    skipped += 1;
                }
            }
        }

        info!(source = "MET", collected = items.len(), skipped, "Items cleaned and formatted");
        SourceReport::completed(Source::Met, items, outcome, skipped)
    }

    async fn search(&self, url: &Url) -> Result<Vec<i64>, AppError> {
        let body = self.transport.get_json(url).await?;
        let response: MetSearchResponse = serde_json::from_value(body)?;
        Ok(response.object_ids.unwrap_or_default())
    }

    async fn fetch_object(&self, id: i64, deadline: Option<Instant>) -> (i64, Result<Item, AppError>) {
        if deadline_passed(deadline) {
            return (id, Err(AppError::DeadlineExceeded));
        }

        let work = async {
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }
            let url = self.object_url(id)?;
            debug!(source = "MET", url = %url, "Requesting object");
            let body = self.transport.get_json(&url).await?;
            let object: MetObject = serde_json::from_value(body)
                .map_err(|e| AppError::InvalidRecord(format!("Unreadable MET object: {}", e)))?;
            object.into_item()
        };

        (id, with_deadline(deadline, work).await)
    }

    fn failure(&self, error: AppError) -> SourceReport {
        warn!(source = "MET", error = %error, "Error calling MET API");
        SourceReport::failed(Source::Met, error.to_string())
    }

    fn deadline_expired(&self, items: Vec<Item>, skipped: usize) -> SourceReport {
        warn!(
            source = "MET",
            collected = items.len(),
            "Deadline reached, returning partial results"
        );
        SourceReport::completed(Source::Met, items, FetchOutcome::DeadlineExpired, skipped)
    }
}
