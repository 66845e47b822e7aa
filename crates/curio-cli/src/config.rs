use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use curio_core::config::{default_config_path, load_settings_file, Settings};
use curio_core::error::AppError;
use curio_core::models::{CriteriaValue, SearchCriteria};

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "curio")]
#[command(
    author,
    version,
    about = "Search the Harvard Art Museums and the MET in one go"
)]
#[command(after_help = "Examples:
  curio search --keyword sunflower --has-image
  curio search --classification Paintings --medium Oil --medium Tempera --pretty
  curio config")]
pub struct Config {
    /// Harvard Art Museums API key
    #[arg(long, env = "HARVARD_API_KEY", hide_env_values = true)]
    pub harvard_api_key: Option<String>,

    /// Custom path to the config.toml settings file
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search both collections and print the combined items as JSON
    #[command(after_help = "Example: curio search --keyword \"water lilies\" --location France")]
    Search(SearchArgs),
    /// Print the resolved settings
    Config,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free-text keyword
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Title filter
    #[arg(short, long)]
    pub title: Option<String>,

    /// Only return objects that have images
    #[arg(long)]
    pub has_image: bool,

    /// Geographic location filter (repeatable)
    #[arg(short, long, value_name = "PLACE")]
    pub location: Vec<String>,

    /// Object classification filter (repeatable)
    #[arg(long, value_name = "NAME")]
    pub classification: Vec<String>,

    /// Medium filter (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub medium: Vec<String>,

    /// Per-source result ceiling
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl SearchArgs {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            keyword: self.keyword.clone(),
            title: self.title.clone(),
            has_image: self.has_image,
            location: criteria_value(&self.location),
            classification: criteria_value(&self.classification),
            medium: criteria_value(&self.medium),
        }
    }
}

/// A single flag value stays a plain string; repeated flags become a list.
fn criteria_value(values: &[String]) -> Option<CriteriaValue> {
    match values {
        [] => None,
        [single] => Some(CriteriaValue::Text(single.clone())),
        many => Some(CriteriaValue::List(many.to_vec())),
    }
}

impl Config {
    /// Resolves settings: defaults, then the TOML file, then the environment,
    /// then command-line flags.
    ///
    /// An explicitly passed `--config` file must exist; the default location
    /// is skipped when absent.
    pub fn resolve_settings<F>(&self, lookup: F) -> Result<Settings, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        match &self.config {
            Some(path) => settings.apply_file(load_settings_file(path)?),
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    settings.apply_file(load_settings_file(&path)?);
                }
            }
        }

        settings.apply_env(lookup)?;

        if let Some(key) = self.harvard_api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            settings.harvard_api_key = Some(key.clone());
        }
        if let Command::Search(args) = &self.command {
            if let Some(max) = args.max_results {
                settings.set_max_results(max);
            }
        }

        Ok(settings)
    }
}

/// Masks all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_search_flags() {
        let config = Config::parse_from([
            "curio",
            "search",
            "--keyword",
            "sunflower",
            "--has-image",
            "--medium",
            "Oil",
            "--medium",
            "Ink",
            "--location",
            "France",
        ]);

        let Command::Search(args) = config.command else {
            panic!("expected search command");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.keyword.as_deref(), Some("sunflower"));
        assert!(criteria.has_image);
        assert_eq!(
            criteria.medium,
            Some(CriteriaValue::List(vec!["Oil".to_string(), "Ink".to_string()]))
        );
        assert_eq!(criteria.location, Some(CriteriaValue::from("France")));
        assert_eq!(criteria.classification, None);
    }

    #[test]
    fn test_empty_search_is_default_criteria() {
        let config = Config::parse_from(["curio", "search"]);
        let Command::Search(args) = config.command else {
            panic!("expected search command");
        };
        assert_eq!(args.criteria(), SearchCriteria::default());
    }

    #[test]
    fn test_settings_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "harvard_api_key = \"from-file\"\nmax_results = 40\nmet_concurrency = 2").unwrap();

        let config = Config::parse_from([
            "curio",
            "--config",
            file.path().to_str().unwrap(),
            "search",
            "--max-results",
            "10",
        ]);
        let settings = config
            .resolve_settings(|key| match key {
                "CURIO_MAX_RESULTS" => Some("25".to_string()),
                "CURIO_MET_CONCURRENCY" => Some("6".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(settings.harvard_api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.fetch.met_concurrency, 6);
        assert_eq!(settings.fetch.max_results, 10);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let config = Config::parse_from(["curio", "--config", "/nonexistent/curio.toml", "config"]);
        let result = config.resolve_settings(no_env);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdef123456"), "****3456");
        assert_eq!(mask_secret("abc"), "****");
    }
}
