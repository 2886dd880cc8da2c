//! Configuration data model.
//!
//! Every section deserializes with `#[serde(default)]` so a partial (or empty)
//! `jobcrew.toml` resolves to the calibrated defaults.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL_BASE_URL,
    DEFAULT_MODEL_ID, DEFAULT_MODEL_KEY_ENV, DEFAULT_SCRAPE_TIMEOUT_SECS,
    DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_KEY_ENV, DEFAULT_SEARCH_RESULTS,
    DEFAULT_TEMPERATURE,
};
use crate::error::ConfigError;
use crate::retry::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_SECS, DEFAULT_JITTER_MAX_SECS,
    DEFAULT_MAX_DELAY_SECS, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_DELAY_SECS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retry: RetrySettings,
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub network: NetworkConfig,
    pub crew: CrewConfig,
}

impl Config {
    /// Validated retry policy built from the `[retry]` section.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::try_from(&self.retry)
    }
}

/// Raw retry timing from `[retry]`, in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub base_delay_secs: f64,
    pub max_delay_secs: f64,
    pub rate_limit_delay_secs: f64,
    pub max_retries: u32,
    pub backoff_multiplier: f64,
    pub jitter_max_secs: f64,
    /// Keep the standard backoff after a rate-limit wait.
    pub backoff_after_rate_limit: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            base_delay_secs: DEFAULT_BASE_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            rate_limit_delay_secs: DEFAULT_RATE_LIMIT_DELAY_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter_max_secs: DEFAULT_JITTER_MAX_SECS,
            backoff_after_rate_limit: true,
        }
    }
}

impl TryFrom<&RetrySettings> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(settings: &RetrySettings) -> Result<Self, Self::Error> {
        let base = seconds("retry.base_delay_secs", settings.base_delay_secs)?;
        let max = seconds("retry.max_delay_secs", settings.max_delay_secs)?;
        let rate_limit = seconds("retry.rate_limit_delay_secs", settings.rate_limit_delay_secs)?;
        let jitter = seconds("retry.jitter_max_secs", settings.jitter_max_secs)?;

        if base.is_zero() {
            return Err(ConfigError::Invalid(
                "retry.base_delay_secs must be greater than zero".to_string(),
            ));
        }
        if max < base {
            return Err(ConfigError::Invalid(format!(
                "retry.max_delay_secs ({}) must be at least retry.base_delay_secs ({})",
                settings.max_delay_secs, settings.base_delay_secs
            )));
        }
        if settings.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_retries must be at least 1".to_string(),
            ));
        }
        if !settings.backoff_multiplier.is_finite() || settings.backoff_multiplier <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "retry.backoff_multiplier must be greater than 1 (got {})",
                settings.backoff_multiplier
            )));
        }

        Ok(RetryPolicy::default()
            .with_base_delay(base)
            .with_max_delay(max)
            .with_rate_limit_delay(rate_limit)
            .with_max_retries(settings.max_retries)
            .with_backoff_multiplier(settings.backoff_multiplier)
            .with_jitter_max(jitter)
            .with_backoff_after_rate_limit(settings.backoff_after_rate_limit))
    }
}

fn seconds(key: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!(
            "{key} must be a finite, non-negative number of seconds (got {value})"
        ))
    })
}

/// Generative-language API settings under `[model]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    /// Inline key; resolved from `api_key_env` at load time when empty.
    pub api_key: String,
    pub api_key_env: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            model: DEFAULT_MODEL_ID.to_string(),
            api_key: String::new(),
            api_key_env: DEFAULT_MODEL_KEY_ENV.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Web search settings under `[search]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_key_env: String,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            api_key: String::new(),
            api_key_env: DEFAULT_SEARCH_KEY_ENV.to_string(),
            max_results: DEFAULT_SEARCH_RESULTS,
        }
    }
}

/// Network/HTTP timeout policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout for model API requests.
    pub api_timeout_secs: u64,
    /// Timeout for search and scrape requests.
    pub scrape_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            scrape_timeout_secs: DEFAULT_SCRAPE_TIMEOUT_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs.max(1))
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs.max(1))
    }
}

/// Pipeline behavior under `[crew]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrewConfig {
    /// Log every task output in full.
    pub verbose: bool,
    /// Run the trailing industry-analysis task.
    pub include_industry_analysis: bool,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            include_industry_analysis: true,
        }
    }
}

/// Where the effective configuration file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Local(PathBuf),
    Global(PathBuf),
    BuiltInDefaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::Global(path) => {
                write!(f, "{}", path.display())
            }
            Self::BuiltInDefaults => f.write_str("built-in defaults"),
        }
    }
}

/// Configuration payload plus where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}
