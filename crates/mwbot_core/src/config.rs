use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::merge::Merge;

pub const DEFAULT_SUMMARY: &str = "MWBot";
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/bigdata/namespace/wdq/sparql";

/// Bot configuration. Every field is optional so the same type serves as the
/// built-in defaults, a TOML section, an environment overlay and a caller patch.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BotOptions {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_summary: Option<String>,
    pub verbose: Option<bool>,
    /// Advisory only; the client never schedules work itself.
    pub concurrency: Option<usize>,
    pub sparql_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BotConfigFile {
    #[serde(default)]
    pub bot: BotOptions,
}

impl BotOptions {
    pub fn defaults() -> Self {
        Self {
            api_url: None,
            username: None,
            password: None,
            default_summary: Some(DEFAULT_SUMMARY.to_string()),
            verbose: Some(false),
            concurrency: Some(1),
            sparql_endpoint: Some(DEFAULT_SPARQL_ENDPOINT.to_string()),
        }
    }

    /// Credentials-only patch, the usual argument to `login`.
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Overlay read from `MWBOT_*` environment variables. Blank values are ignored.
    pub fn from_env() -> Self {
        Self {
            api_url: env_value("MWBOT_API_URL"),
            username: env_value("MWBOT_USERNAME"),
            password: env_value("MWBOT_PASSWORD"),
            default_summary: env_value("MWBOT_SUMMARY"),
            verbose: env_value("MWBOT_VERBOSE").map(|value| parse_flag(&value)),
            concurrency: env_value("MWBOT_CONCURRENCY").and_then(|value| value.parse().ok()),
            sparql_endpoint: env_value("MWBOT_SPARQL_ENDPOINT"),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn summary(&self) -> &str {
        self.default_summary.as_deref().unwrap_or(DEFAULT_SUMMARY)
    }

    pub fn sparql_endpoint(&self) -> &str {
        self.sparql_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SPARQL_ENDPOINT)
    }
}

impl Merge for BotOptions {
    fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            default_summary: other.default_summary.or(self.default_summary),
            verbose: other.verbose.or(self.verbose),
            concurrency: other.concurrency.or(self.concurrency),
            sparql_endpoint: other.sparql_endpoint.or(self.sparql_endpoint),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load the `[bot]` section of a TOML file. Returns an empty patch if the file doesn't exist.
pub fn load_options(config_path: &Path) -> Result<BotOptions, ConfigError> {
    if !config_path.exists() {
        return Ok(BotOptions::default());
    }
    let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.display().to_string(),
        source,
    })?;
    let parsed: BotConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.display().to_string(),
        source,
    })?;
    Ok(parsed.bot)
}

/// Derive the wiki base URL from an API URL by stripping `/api.php`.
pub fn derive_wiki_url(api_url: &str) -> Option<String> {
    let trimmed = api_url.trim();
    let stripped = trimmed.strip_suffix("/api.php").unwrap_or(trimmed);
    let result = stripped.trim_end_matches('/').to_string();
    if result.is_empty() { None } else { Some(result) }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
