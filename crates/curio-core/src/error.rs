use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while answering a
/// collection search. It uses the `thiserror` crate for ergonomic error handling.
///
/// # Degradation tiers
///
/// Transport and shape errors are absorbed at the source fetcher boundary and
/// never reach the caller of an aggregated search:
/// - `ClientError`, `NetworkError`, `Timeout`, `RateLimitExceeded` and
///   `SerializationError` degrade a whole source (or a single MET object).
/// - `InvalidRecord` drops one upstream record.
/// - `UnsupportedMethod` and `InvalidRequest` are raised at the entry boundary
///   before any fetch begins.
/// - `Internal` is the only error an aggregated search can return.
///
/// # Examples
///
/// ```no_run
/// use curio_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::Generic("Something went wrong".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP client request failed.
    ///
    /// This error occurs when HTTP requests fail due to non-success statuses,
    /// unreadable bodies, or errors raised by the HTTP client itself.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// JSON serialization or deserialization failed.
    ///
    /// This error occurs when an upstream body is not JSON or does not have the
    /// envelope shape expected for that source.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing failed.
    ///
    /// This error occurs when an endpoint, a translated query, or a pagination
    /// link cannot be turned into a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or connection error.
    ///
    /// This error occurs when a network request fails due to connectivity issues,
    /// DNS resolution failures, or the remote server being unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    ///
    /// This error occurs when a request takes longer than the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    ///
    /// This error occurs when an upstream keeps answering 429 after all retries.
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// The caller-supplied deadline passed before the request completed.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// A single upstream record could not be normalized into an `Item`.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The incoming search request body is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The endpoint was called with a method other than `POST`.
    #[error("Invalid API Method Used : {0}")]
    UnsupportedMethod(String),

    /// Configuration could not be loaded or contains invalid values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An unexpected failure while combining source results.
    ///
    /// Source failures never produce this; it signals a defect such as a
    /// panicked fetch task.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The museum API may be slow or unreachable.\n   Try again later.".to_string()
                } else if msg.contains("401") || msg.contains("403") {
                    format!("Upstream rejected the request: {}\n   Check your HARVARD_API_KEY environment variable.", msg)
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!("Request timed out after {} seconds.\n   The server may be overloaded. Try again later.", secs)
            }
            AppError::RateLimitExceeded => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            AppError::ConfigError(msg) => {
                format!("Configuration error: {}\n   Example: HARVARD_API_KEY=<key> curio search --keyword sunflower", msg)
            }
            AppError::UnsupportedMethod(method) => {
                format!("Invalid API Method Used : {}", method)
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use curio_core::error::AppError;
    ///
    /// // Network errors are retryable
    /// let err = AppError::NetworkError("connection reset".to_string());
    /// assert!(err.is_retryable());
    ///
    /// // Rate limits are retryable (after a delay)
    /// let err = AppError::RateLimitExceeded;
    /// assert!(err.is_retryable());
    ///
    /// // A malformed record is NOT retryable
    /// let err = AppError::InvalidRecord("missing id".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded
        )
    }
}
