//! Default configuration constants.
//!
//! Retry timing defaults live with the retry policy itself; this module holds
//! the remote-service and pipeline defaults.

/// Default Gemini REST endpoint root.
pub(super) const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model id.
pub(super) const DEFAULT_MODEL_ID: &str = "gemini-1.5-flash";
/// Env var consulted for the model API key when none is configured inline.
pub(super) const DEFAULT_MODEL_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Sampling temperature for all crew tasks.
pub(super) const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Output cap per model call; kept small to conserve quota.
pub(super) const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;

/// Default Serper search endpoint.
pub(super) const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
/// Env var consulted for the search API key.
pub(super) const DEFAULT_SEARCH_KEY_ENV: &str = "SERPER_API_KEY";
/// Number of organic results requested per search.
pub(super) const DEFAULT_SEARCH_RESULTS: usize = 8;

/// Default timeout for model API requests.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
/// Default timeout for search and scrape requests.
pub(super) const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 20;

/// Local config file name, also used under the per-user config dir.
pub(super) const CONFIG_FILE_NAME: &str = "jobcrew.toml";
/// Per-user config directory name.
pub(super) const CONFIG_DIR_NAME: &str = "jobcrew";
