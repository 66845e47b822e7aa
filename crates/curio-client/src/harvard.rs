use std::sync::Arc;

use curio_core::error::AppError;
use curio_core::models::Item;
use curio_core::normalize::{lenient_list, lenient_text, parse_identifier, UNKNOWN_CENTURY};
use curio_core::query::encode_component;
use curio_core::report::{FetchOutcome, Source, SourceReport};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::transport::{deadline_passed, with_deadline, JsonTransport};

/// One page of the Harvard `object` endpoint.
///
/// Harvard API reference: <https://github.com/harvardartmuseums/api-docs>
///
/// ```json
/// {
///     "info": { "totalrecords": 1432, "next": "https://...&page=2" },
///     "records": [ ... ]
/// }
/// ```
///
/// Records stay raw JSON so one malformed record is dropped on its own.
#[derive(Deserialize, Debug)]
struct HarvardPage {
    info: PageInfo,
    records: Vec<Value>,
}

/// Pagination envelope.
#[derive(Deserialize, Debug)]
struct PageInfo {
    #[serde(default)]
    totalrecords: Option<u64>,
    #[serde(default)]
    next: Option<String>,
}

/// Data Transfer Object for one Harvard object record.
///
/// # Examples
///
/// ```
/// use curio_client::harvard::HarvardRecord;
///
/// let json = r#"{
///     "id": 299843,
///     "title": "Self-Portrait Dedicated to Paul Gauguin",
///     "century": "19th century",
///     "people": [{"name": "Vincent van Gogh", "birthplace": "Zundert", "culture": "Dutch"}],
///     "images": [{"baseimageurl": "https://nrs.harvard.edu/urn-3:HUAM:DDC251942"}]
/// }"#;
///
/// let record: HarvardRecord = serde_json::from_str(json).unwrap();
/// let item = record.into_item().unwrap();
/// assert_eq!(item.article_id, 299843);
/// assert_eq!(item.artist_nationality.as_deref(), Some("Dutch"));
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct HarvardRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub creditline: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub division: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub classification: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dated: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub century: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Option<Vec<HarvardImage>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub people: Option<Vec<HarvardPerson>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct HarvardImage {
    #[serde(default, deserialize_with = "lenient_text")]
    pub baseimageurl: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct HarvardPerson {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birthplace: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub culture: Option<String>,
}

impl HarvardRecord {
    /// Base URL of the first published image.
    pub fn image_url(&self) -> Option<String> {
        self.images.as_ref()?.first()?.baseimageurl.clone()
    }

    /// Name of the first listed person.
    pub fn artist_name(&self) -> Option<String> {
        self.first_person()?.name.clone()
    }

    /// Culture of the first listed person, reported only when that person has
    /// both a name and a birthplace.
    pub fn artist_nationality(&self) -> Option<String> {
        let person = self.first_person()?;
        if person.name.is_some() && person.birthplace.is_some() {
            person.culture.clone()
        } else {
            None
        }
    }

    fn first_person(&self) -> Option<&HarvardPerson> {
        self.people.as_ref()?.first()
    }

    /// Converts the record into the shared `Item` model.
    ///
    /// Harvard publishes its own century label, which is passed through as-is.
    /// A record without one gets the unknown-century label.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRecord` if `id` is absent or not numeric.
    pub fn into_item(self) -> Result<Item, AppError> {
        let article_id = parse_identifier(self.id.as_ref())
            .ok_or_else(|| AppError::InvalidRecord("Harvard record without a numeric id".to_string()))?;

        let image_url = self.image_url();
        let artist_name = self.artist_name();
        let artist_nationality = self.artist_nationality();

        Ok(Item {
            credit_line: self.creditline,
            article_division: self.division,
            article_id,
            article_classification: self.classification,
            image_url,
            artist_name,
            technique: self.medium,
            title: self.title,
            date: self.dated,
            item_url: self.url,
            century: self.century.unwrap_or_else(|| UNKNOWN_CENTURY.to_string()),
            artist_nationality,
        })
    }
}

/// Paginating client for the Harvard Art Museums `object` endpoint.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use curio_client::{HarvardClient, ReqwestTransport};
/// use curio_core::HttpConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(ReqwestTransport::new(&HttpConfig::default())?);
/// let client = HarvardClient::new(
///     transport,
///     "https://api.harvardartmuseums.org/object",
///     "your-api-key",
///     150,
/// );
/// let report = client.fetch("?q=sunflower&medium=any&hasimage=1", None).await;
/// println!("Harvard returned {} items", report.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HarvardClient {
    transport: Arc<dyn JsonTransport>,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl HarvardClient {
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        base_url: &str,
        api_key: &str,
        max_results: usize,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            max_results: max_results.max(1),
        }
    }

    /// First page URL: the translated query plus the API key.
    pub fn first_page_url(&self, query: &str) -> Result<Url, AppError> {
        let separator = if query.is_empty() { '?' } else { '&' };
        let raw = format!(
            "{}{}{}apikey={}",
            self.base_url,
            query,
            separator,
            encode_component(&self.api_key)
        );
        Url::parse(&raw).map_err(|e| AppError::InvalidUrl(format!("{}: {}", e, self.base_url)))
    }

    /// Collects up to `max_results` items, following `info.next` links.
    ///
    /// Never fails: a transport or envelope failure on any page yields an empty,
    /// failed report. Records without a numeric id are skipped. When `deadline`
    /// passes, the items gathered so far are returned.
    pub async fn fetch(&self, query: &str, deadline: Option<Instant>) -> SourceReport {
        let mut items = Vec::new();
        let mut skipped = 0;

        let mut next = match self.first_page_url(query) {
            Ok(url) => Some(url),
            Err(e) => return self.failure(e),
        };

        while let Some(url) = next.take() {
            if deadline_passed(deadline) {
                return self.deadline_expired(items, skipped);
            }

            info!(source = "Harvard", url = %redact_api_key(&url), "Requesting page");

            let page = match with_deadline(deadline, self.get_page(&url)).await {
                Ok(page) => page,
                Err(AppError::DeadlineExceeded) => return self.deadline_expired(items, skipped),
                Err(e) => return self.failure(e),
            };

            info!(
                source = "Harvard",
                total_records = page.info.totalrecords.unwrap_or_default(),
                "Page received"
            );

            for raw in page.records {
                if items.len() >= self.max_results {
                    break;
                }
                match normalize_record(raw) {
                    Ok(item) => {
                        debug!(source = "Harvard", item_id = item.article_id, "Item formatted");
                        items.push(item);
                    }
                    Err(e) => {
                        warn!(source = "Harvard", error = %e, "Skipping record");
                        skipped += 1;
                    }
                }
            }

            info!(source = "Harvard", collected = items.len(), "Items cleaned and formatted");

            if items.len() >= self.max_results {
                return SourceReport::completed(
                    Source::Harvard,
                    items,
                    FetchOutcome::CeilingReached,
                    skipped,
                );
            }

            if let Some(link) = page.info.next {
                match Url::parse(&link) {
                    Ok(url) => next = Some(url),
                    Err(e) => {
                        return self.failure(AppError::InvalidUrl(format!(
                            "Bad next-page link '{}': {}",
                            link, e
                        )))
                    }
                }
            }
        }

        SourceReport::completed(Source::Harvard, items, FetchOutcome::Exhausted, skipped)
    }

    async fn get_page(&self, url: &Url) -> Result<HarvardPage, AppError> {
        let body = self.transport.get_json(url).await?;
        Ok(serde_json::from_value(body)?)
    }

    fn failure(&self, error: AppError) -> SourceReport {
        warn!(source = "Harvard", error = %error, "Error calling Harvard API");
        SourceReport::failed(Source::Harvard, error.to_string())
    }

    fn deadline_expired(&self, items: Vec<Item>, skipped: usize) -> SourceReport {
        warn!(
            source = "Harvard",
            collected = items.len(),
            "Deadline reached, returning partial results"
        );
        SourceReport::completed(Source::Harvard, items, FetchOutcome::DeadlineExpired, skipped)
    }
}

fn normalize_record(raw: Value) -> Result<Item, AppError> {
    let record: HarvardRecord = serde_json::from_value(raw)
        .map_err(|e| AppError::InvalidRecord(format!("Unreadable Harvard record: {}", e)))?;
    record.into_item()
}

/// Renders a URL for logs with the `apikey` value hidden.
fn redact_api_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}
