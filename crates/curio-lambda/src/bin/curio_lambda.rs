use std::sync::Arc;
use std::time::Duration;

use curio_client::Aggregator;
use curio_core::Settings;
use curio_lambda::{handle_gateway_event, invocation_deadline, ApiGatewayResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handle_request(
    event: LambdaEvent<Value>,
    aggregator: Arc<Aggregator>,
    margin: Duration,
) -> Result<ApiGatewayResponse, Error> {
    let deadline = invocation_deadline(event.context.deadline, margin);
    Ok(handle_gateway_event(event.payload, aggregator.as_ref(), deadline).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .without_time()
        .init();

    let settings =
        Settings::from_env().map_err(|error| Error::from(format!("invalid settings: {error}")))?;
    let aggregator = Arc::new(
        Aggregator::from_settings(&settings)
            .map_err(|error| Error::from(format!("failed to build aggregator: {error}")))?,
    );
    let margin = settings.deadline_margin;

    info!(
        max_results = settings.fetch.max_results,
        met_concurrency = settings.fetch.met_concurrency,
        "Curio search function ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let aggregator = Arc::clone(&aggregator);
        async move { handle_request(event, aggregator, margin).await }
    }))
    .await
}
