//! Curio Core - Domain types, query translation, normalization rules, and configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod report;
pub mod request;

pub use config::{
    default_config_path, load_settings_file, Endpoints, FetchConfig, HttpConfig, Settings,
    SettingsFile,
};
pub use error::AppError;
pub use models::{CriteriaValue, Item, SearchCriteria};
pub use query::{translate, TranslatedQueries};
pub use report::{AggregateResult, FetchOutcome, Source, SourceReport, SourceSummary};
pub use request::ensure_search_method;
