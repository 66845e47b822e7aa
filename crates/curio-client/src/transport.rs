use async_trait::async_trait;
use curio_core::config::HttpConfig;
use curio_core::error::AppError;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

/// Fetches a URL and returns its body as JSON.
///
/// Both source fetchers go through this seam so one HTTP client is shared per
/// process and fetchers can be exercised without a network.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, AppError>;
}

/// [`JsonTransport`] backed by a long-lived `reqwest` client.
///
/// # Examples
///
/// ```no_run
/// use curio_client::{JsonTransport, ReqwestTransport};
/// use curio_core::HttpConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::new(&HttpConfig::default())?;
/// let url = "https://collectionapi.metmuseum.org/public/collection/v1/objects/436524".parse()?;
/// let object = transport.get_json(&url).await?;
/// println!("{}", object["title"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_retries: u32,
    retry_base_delay: Duration,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_base_delay: config.retry_base_delay,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Makes an HTTP GET request with automatic retry on transient failures.
    ///
    /// Implements backoff for retries on:
    /// - Network errors
    /// - Timeouts
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    async fn request_with_retry(&self, url: &Url) -> Result<reqwest::Response, AppError> {
        let mut last_error = AppError::Generic("No attempts made".to_string());

        for attempt in 1..=self.max_retries {
            match self.client.get(url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return Ok(resp);
                    }

                    // Rate limited - retry with exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = AppError::RateLimitExceeded;
                        if attempt < self.max_retries {
                            sleep(self.retry_base_delay * 2_u32.pow(attempt)).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    if status.is_server_error() {
                        last_error = AppError::ClientError(format!(
                            "Server error: HTTP {}",
                            status.as_u16()
                        ));
                        if attempt < self.max_retries {
                            sleep(self.retry_base_delay * attempt).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    // Client error (4xx except 429) - don't retry
                    return Err(AppError::ClientError(format!(
                        "HTTP {} from {}",
                        status.as_u16(),
                        url.path()
                    )));
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = AppError::Timeout(self.timeout_secs);
                    } else if e.is_connect() {
                        last_error = AppError::NetworkError(format!("Connection failed: {}", e));
                    } else {
                        last_error = AppError::ClientError(e.to_string());
                    }

                    if attempt < self.max_retries && last_error.is_retryable() {
                        debug!(attempt, error = %last_error, "Retrying upstream request");
                        sleep(self.retry_base_delay * attempt).await;
                        continue;
                    }
                    return Err(last_error);
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, AppError> {
        let resp = self.request_with_retry(url).await?;

        let body = resp
            .text()
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// Runs `work` until `deadline`, mapping expiry to `AppError::DeadlineExceeded`.
pub async fn with_deadline<T, F>(deadline: Option<Instant>, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match deadline {
        Some(deadline) => timeout_at(deadline, work)
            .await
            .unwrap_or_else(|_| Err(AppError::DeadlineExceeded)),
        None => work.await,
    }
}

/// True once `deadline` is set and has passed.
pub fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport() {
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        assert_eq!(transport.max_retries, 3);
        assert_eq!(transport.timeout_secs, 30);
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let config = HttpConfig {
            max_retries: 0,
            ..HttpConfig::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.max_retries, 1);
    }

    #[tokio::test]
    async fn test_with_deadline_passes_through() {
        let result = with_deadline(None, async { Ok::<_, AppError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_deadline_expires() {
        let deadline = Instant::now() + Duration::from_millis(10);
        let result = with_deadline(Some(deadline), async {
            sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;
        assert!(matches!(result, Err(AppError::DeadlineExceeded)));
    }

    #[test]
    fn test_deadline_passed() {
        assert!(!deadline_passed(None));
        assert!(deadline_passed(Some(Instant::now() - Duration::from_millis(1))));
        assert!(!deadline_passed(Some(Instant::now() + Duration::from_secs(60))));
    }
}
