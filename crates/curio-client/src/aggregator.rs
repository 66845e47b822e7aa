use std::sync::Arc;

use async_trait::async_trait;
use curio_core::config::Settings;
use curio_core::error::AppError;
use curio_core::models::SearchCriteria;
use curio_core::query::translate;
use curio_core::report::AggregateResult;
use tokio::time::Instant;
use tracing::{error, info};

use crate::harvard::HarvardClient;
use crate::met::MetClient;
use crate::transport::{JsonTransport, ReqwestTransport};

/// Anything that can answer an aggregated collection search.
///
/// Entry points depend on this trait rather than on [`Aggregator`] directly.
#[async_trait]
pub trait CollectionSearch: Send + Sync {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        deadline: Option<Instant>,
    ) -> Result<AggregateResult, AppError>;
}

/// Runs the Harvard and MET fetchers side by side and concatenates their items.
#[derive(Clone)]
pub struct Aggregator {
    harvard: HarvardClient,
    met: MetClient,
}

impl Aggregator {
    pub fn new(harvard: HarvardClient, met: MetClient) -> Self {
        Self { harvard, met }
    }

    /// Builds both clients over one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if no Harvard API key is configured and
    /// `AppError::ClientError` if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let transport = Arc::new(ReqwestTransport::new(&settings.http)?);
        Self::with_transport(settings, transport)
    }

    /// Builds both clients over the given transport.
    pub fn with_transport(
        settings: &Settings,
        transport: Arc<dyn JsonTransport>,
    ) -> Result<Self, AppError> {
        let api_key = settings.require_api_key()?;
        let max_results = settings.fetch.max_results;

        let harvard = HarvardClient::new(
            Arc::clone(&transport),
            &settings.endpoints.harvard_object_url,
            api_key,
            max_results,
        );
        let met = MetClient::new(
            transport,
            &settings.endpoints.met_search_url,
            &settings.endpoints.met_object_url,
            max_results,
        )
        .with_concurrency(settings.fetch.met_concurrency)
        .with_rate_limit(settings.fetch.met_requests_per_second);

        Ok(Self::new(harvard, met))
    }
}

#[async_trait]
impl CollectionSearch for Aggregator {
    /// Fetches both sources concurrently and returns Harvard's items followed
    /// by MET's.
    ///
    /// Source failures are absorbed by the fetchers. The only error is
    /// `AppError::Internal`, raised when a fetch task itself dies.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        deadline: Option<Instant>,
    ) -> Result<AggregateResult, AppError> {
        let queries = translate(criteria);
        info!(?criteria, "Parsed search criteria");
        info!(query = %queries.harvard, "Harvard finished query string");
        info!(query = %queries.met, "MET finished query string");

        let harvard = self.harvard.clone();
        let harvard_query = queries.harvard;
        let harvard_task =
            tokio::spawn(async move { harvard.fetch(&harvard_query, deadline).await });

        let met = self.met.clone();
        let met_query = queries.met;
        let met_task = tokio::spawn(async move { met.fetch(&met_query, deadline).await });

        let (harvard_report, met_report) = tokio::join!(harvard_task, met_task);

        let harvard_report = harvard_report.map_err(|e| {
            error!(error = %e, "Harvard fetch task failed");
            AppError::Internal(format!("Harvard fetch task failed: {}", e))
        })?;
        let met_report = met_report.map_err(|e| {
            error!(error = %e, "MET fetch task failed");
            AppError::Internal(format!("MET fetch task failed: {}", e))
        })?;

        let result = AggregateResult::combine(harvard_report, met_report);
        info!(
            "Both calls completed. Harvard : {} | MET : {} | Combined : {}",
            result.harvard.count,
            result.met.count,
            result.total()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ids, Canned, FakeTransport};
    use curio_core::report::FetchOutcome;
    use curio_core::CriteriaValue;
    use serde_json::{json, Value};

    const HARVARD: &str = "https://api.harvardartmuseums.org/object";
    const SEARCH: &str = "https://collectionapi.metmuseum.org/public/collection/v1/search";
    const OBJECTS: &str = "https://collectionapi.metmuseum.org/public/collection/v1/objects";

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.harvard_api_key = Some("key".to_string());
        settings.fetch.met_requests_per_second = 1000;
        settings
    }

    fn harvard_page(ids: &[i64]) -> Value {
        json!({
            "info": {"totalrecords": ids.len(), "next": null},
            "records": ids.iter().map(|id| json!({"id": id, "century": "20th century"})).collect::<Vec<_>>()
        })
    }

    fn seed_met(transport: &FakeTransport, query: &str, object_ids: &[i64]) {
        transport.json(&format!("{}{}", SEARCH, query), json!({"objectIDs": object_ids}));
        for id in object_ids {
            transport.json(
                &format!("{}/{}", OBJECTS, id),
                json!({"objectID": id, "objectDate": "1925"}),
            );
        }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            keyword: Some("sunflower".to_string()),
            has_image: true,
            classification: Some(CriteriaValue::from("Paintings")),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let result = Aggregator::with_transport(&Settings::default(), Arc::new(FakeTransport::new()));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_harvard_items_come_first() {
        let transport = Arc::new(FakeTransport::new());
        transport.json(
            &format!("{}?q=sunflower&medium=any&hasimage=1&apikey=key", HARVARD),
            harvard_page(&[100, 101]),
        );
        seed_met(
            &transport,
            "?q=sunflower&hasImages=true&classification=Paintings",
            &[5, 6, 7],
        );

        let aggregator = Aggregator::with_transport(&settings(), transport).unwrap();
        let result = aggregator.search(&criteria(), None).await.unwrap();

        assert_eq!(ids(&result.items), vec![100, 101, 5, 6, 7]);
        assert_eq!(result.harvard.count, 2);
        assert_eq!(result.met.count, 3);
        assert_eq!(result.items[0].century, "20th century");
        assert_eq!(result.items[2].century, "20th Century");
    }

    #[tokio::test]
    async fn test_unreachable_harvard_returns_met_only() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            &format!("{}?q=sunflower&medium=any&hasimage=1&apikey=key", HARVARD),
            Canned::Unreachable,
        );
        seed_met(
            &transport,
            "?q=sunflower&hasImages=true&classification=Paintings",
            &[5, 6],
        );

        let aggregator = Aggregator::with_transport(&settings(), transport).unwrap();
        let result = aggregator.search(&criteria(), None).await.unwrap();

        assert_eq!(ids(&result.items), vec![5, 6]);
        assert_eq!(result.harvard.outcome, FetchOutcome::Failed);
        assert_eq!(result.harvard.count, 0);
    }

    #[tokio::test]
    async fn test_both_sources_failing_is_an_empty_success() {
        let transport = Arc::new(FakeTransport::new());

        let aggregator = Aggregator::with_transport(&settings(), transport).unwrap();
        let result = aggregator.search(&SearchCriteria::default(), None).await.unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.harvard.outcome, FetchOutcome::Failed);
        assert_eq!(result.met.outcome, FetchOutcome::Failed);
    }

    #[tokio::test]
    async fn test_ceiling_applies_per_source() {
        let transport = Arc::new(FakeTransport::new());
        transport.json(
            &format!("{}?medium=any&hasimage=0&apikey=key", HARVARD),
            harvard_page(&[1, 2, 3, 4]),
        );
        seed_met(&transport, "?hasImages=false", &[10, 11, 12, 13]);

        let mut settings = settings();
        settings.set_max_results(2);
        let aggregator = Aggregator::with_transport(&settings, transport).unwrap();
        let result = aggregator.search(&SearchCriteria::default(), None).await.unwrap();

        assert_eq!(ids(&result.items), vec![1, 2, 10, 11]);
    }
}
