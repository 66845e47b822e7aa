//! Configuration types for Curio components.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. Entry points may apply command-line overrides last.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

pub const HARVARD_OBJECT_URL: &str = "https://api.harvardartmuseums.org/object";
pub const MET_SEARCH_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1/search";
pub const MET_OBJECT_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1/objects";

/// Default result ceiling per source.
pub const DEFAULT_MAX_RESULTS: usize = 150;

/// HTTP client configuration for upstream API calls.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            user_agent: "Curio/0.1 (museum-search-aggregator)".to_string(),
        }
    }
}

/// Limits applied while fetching from each source.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Maximum number of items collected from one source per request.
    pub max_results: usize,
    /// Number of MET object requests allowed in flight at once.
    pub met_concurrency: usize,
    /// Upper bound on MET object requests per second.
    pub met_requests_per_second: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            met_concurrency: 4,
            met_requests_per_second: 20,
        }
    }
}

/// Upstream endpoint URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub harvard_object_url: String,
    pub met_search_url: String,
    pub met_object_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            harvard_object_url: HARVARD_OBJECT_URL.to_string(),
            met_search_url: MET_SEARCH_URL.to_string(),
            met_object_url: MET_OBJECT_URL.to_string(),
        }
    }
}

/// Fully resolved settings for an aggregated search.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub http: HttpConfig,
    pub fetch: FetchConfig,
    pub endpoints: Endpoints,
    pub harvard_api_key: Option<String>,
    /// Time reserved before an invocation deadline for building the response.
    pub deadline_margin: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            fetch: FetchConfig::default(),
            endpoints: Endpoints::default(),
            harvard_api_key: None,
            deadline_margin: Duration::from_secs(2),
        }
    }
}

/// Optional values read from a TOML settings file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub harvard_api_key: Option<String>,
    pub max_results: Option<usize>,
    pub met_concurrency: Option<usize>,
    pub met_requests_per_second: Option<u32>,
    pub http_timeout_secs: Option<u64>,
    pub http_max_retries: Option<u32>,
    pub deadline_margin_ms: Option<u64>,
    pub harvard_object_url: Option<String>,
    pub met_search_url: Option<String>,
    pub met_object_url: Option<String>,
}

impl Settings {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Overlays values from a settings file.
    pub fn apply_file(&mut self, file: SettingsFile) {
        if let Some(key) = file.harvard_api_key {
            self.harvard_api_key = Some(key);
        }
        if let Some(max) = file.max_results {
            self.set_max_results(max);
        }
        if let Some(concurrency) = file.met_concurrency {
            self.fetch.met_concurrency = concurrency.max(1);
        }
        if let Some(rps) = file.met_requests_per_second {
            self.fetch.met_requests_per_second = rps.max(1);
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = file.http_max_retries {
            self.http.max_retries = retries.max(1);
        }
        if let Some(ms) = file.deadline_margin_ms {
            self.deadline_margin = Duration::from_millis(ms);
        }
        if let Some(url) = file.harvard_object_url {
            self.endpoints.harvard_object_url = url;
        }
        if let Some(url) = file.met_search_url {
            self.endpoints.met_search_url = url;
        }
        if let Some(url) = file.met_object_url {
            self.endpoints.met_object_url = url;
        }
    }

    /// Overlays environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("HARVARD_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.harvard_api_key = Some(key);
        }
        if let Some(max) = parse_var::<usize>(&lookup, "CURIO_MAX_RESULTS")? {
            self.set_max_results(max);
        }
        if let Some(concurrency) = parse_var::<usize>(&lookup, "CURIO_MET_CONCURRENCY")? {
            self.fetch.met_concurrency = concurrency.max(1);
        }
        if let Some(rps) = parse_var::<u32>(&lookup, "CURIO_MET_RPS")? {
            self.fetch.met_requests_per_second = rps.max(1);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CURIO_HTTP_TIMEOUT_SECS")? {
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var::<u32>(&lookup, "CURIO_HTTP_MAX_RETRIES")? {
            self.http.max_retries = retries.max(1);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CURIO_DEADLINE_MARGIN_MS")? {
            self.deadline_margin = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Sets the per-source ceiling; zero is raised to one.
    pub fn set_max_results(&mut self, max_results: usize) {
        self.fetch.max_results = max_results.max(1);
    }

    /// Returns the Harvard API key or a configuration error.
    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.harvard_api_key
            .as_deref()
            .ok_or_else(|| AppError::ConfigError("HARVARD_API_KEY must be configured".to_string()))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw))),
    }
}

/// Default settings file location: `<config dir>/curio/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("curio").join("config.toml"))
}

/// Reads a TOML settings file.
pub fn load_settings_file(path: &Path) -> Result<SettingsFile, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| AppError::ConfigError(format!("Invalid TOML in {}: {}", path.display(), e)))
}
