//! Unified error types for the crew.
//!
//! Remote-facing errors implement [`Classify`] so the retry executor can tell
//! quota exhaustion apart from ordinary failures without knowing the client.

use crate::retry::{Classify, ErrorClass, RetryError};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from HTTP-backed remote services (model API, search API, scraping).
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the service.
    Status {
        code: u16,
        body: String,
        /// Parsed `Retry-After` header, in seconds.
        retry_after_secs: Option<u64>,
    },
    /// 2xx response whose payload could not be used.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl Classify for ApiError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::Http(e) if e.is_timeout() || e.is_connect() => ErrorClass::Transient,
            Self::Http(_) => ErrorClass::Unclassified,
            Self::Status { code: 429, .. } => ErrorClass::RateLimited,
            // Gemini reports exhausted quota as RESOURCE_EXHAUSTED, not always with 429.
            Self::Status { body, .. } if body.contains("RESOURCE_EXHAUSTED") => {
                ErrorClass::RateLimited
            }
            Self::Status { code, .. } if (500..=599).contains(code) => ErrorClass::Transient,
            Self::Status { .. } | Self::InvalidResponse(_) => ErrorClass::Unclassified,
        }
    }

    fn suggested_delay(&self) -> Option<Duration> {
        match self {
            Self::Status {
                retry_after_secs: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors arising from tool execution.
#[derive(Debug)]
pub enum ToolError {
    /// The caller supplied arguments the tool couldn't parse.
    InvalidArguments(String),
    /// The tool ran but encountered a local failure.
    ExecutionFailed(String),
    /// The remote service behind the tool failed.
    Remote(ApiError),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            Self::ExecutionFailed(msg) => write!(f, "execution failed: {msg}"),
            Self::Remote(e) => write!(f, "remote: {e}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<ApiError> for ToolError {
    fn from(e: ApiError) -> Self {
        Self::Remote(e)
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        Self::Remote(ApiError::Http(e))
    }
}

impl Classify for ToolError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::Remote(e) => e.classify(),
            Self::InvalidArguments(_) | Self::ExecutionFailed(_) => ErrorClass::Unclassified,
        }
    }

    fn suggested_delay(&self) -> Option<Duration> {
        match self {
            Self::Remote(e) => e.suggested_delay(),
            Self::InvalidArguments(_) | Self::ExecutionFailed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CrewError
// ---------------------------------------------------------------------------

/// Top-level error type for a crew run.
#[derive(Debug)]
pub enum CrewError {
    Config(ConfigError),
    /// Startup validation failed (missing keys, bad endpoint, no quota).
    Preflight(String),
    /// A task prompt could not be rendered from the supplied inputs.
    Template(String),
    /// A model call for `task` ran out of retries.
    Model {
        task: String,
        source: RetryError<ApiError>,
    },
    /// The final report could not be written.
    Output(std::io::Error),
}

impl CrewError {
    /// True when the run died on an exhausted quota rather than a hard error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Model { source, .. } if source.is_rate_limited())
    }
}

impl fmt::Display for CrewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Preflight(msg) => write!(f, "preflight: {msg}"),
            Self::Template(msg) => write!(f, "template: {msg}"),
            Self::Model { task, source } => write!(f, "task `{task}` failed: {source}"),
            Self::Output(e) => write!(f, "output: {e}"),
        }
    }
}

impl std::error::Error for CrewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Model { source, .. } => Some(source),
            Self::Output(e) => Some(e),
            Self::Preflight(_) | Self::Template(_) => None,
        }
    }
}

impl From<ConfigError> for CrewError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
