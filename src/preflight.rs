//! Startup preflight validation.
//!
//! These checks run before the crew starts so missing keys and bad endpoints
//! surface as actionable errors instead of raw API failures halfway through
//! a run that has already spent quota.

use tracing::{info, warn};

use crate::api::{GenerateRequest, ModelClient};
use crate::config::Config;
use crate::error::CrewError;
use crate::retry::{execute_with_retry, RetryError, RetryPolicy};

/// Outcome of a successful [`check_connection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Ok,
    /// The probe failed for a reason other than quota; the run may still work.
    Degraded(String),
}

/// Validate that `config` can be used for a crew run.
pub fn validate_config_ready(config: &Config) -> Result<(), String> {
    validate_url("model.base_url", &config.model.base_url)?;
    validate_url("search.endpoint", &config.search.endpoint)?;
    if config.model.model.trim().is_empty() {
        return Err(
            "no model configured. Set `model.model` in jobcrew.toml or JOBCREW_MODEL.".to_string(),
        );
    }
    validate_required_keys(config)
}

/// Both the model and the search key must be set.
pub fn validate_required_keys(config: &Config) -> Result<(), String> {
    let missing: Vec<&str> = [
        (&config.model.api_key, config.model.api_key_env.as_str()),
        (&config.search.api_key, config.search.api_key_env.as_str()),
    ]
    .into_iter()
    .filter(|(key, _)| key.trim().is_empty())
    .map(|(_, env_name)| env_name)
    .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(format!(
        "missing required API keys: {}. Set them in the environment or in jobcrew.toml.",
        missing.join(", ")
    ))
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("no `{field}` configured"));
    }
    let parsed =
        reqwest::Url::parse(trimmed).map_err(|err| format!("invalid `{field}` `{trimmed}`: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(format!(
                "invalid `{field}` `{trimmed}`: unsupported scheme `{other}` (expected http or https)"
            ));
        }
    }
    if parsed.host_str().is_none() {
        return Err(format!("invalid `{field}` `{trimmed}`: missing host"));
    }
    Ok(())
}

/// Send one tiny request to the model.
///
/// A rate-limited probe is fatal: the run would only burn through its retry
/// budget. Any other failure is logged and reported as degraded.
pub async fn check_connection(client: &dyn ModelClient) -> Result<ConnectionStatus, CrewError> {
    info!("testing model API connection");
    let policy = RetryPolicy::default().with_max_retries(1);
    let mut request = GenerateRequest::new("Hello");
    request.temperature = Some(0.0);
    request.max_output_tokens = Some(10);
    let request = &request;

    match execute_with_retry(move || client.generate(request), Some(&policy)).await {
        Ok(_) => {
            info!("model API connection successful");
            Ok(ConnectionStatus::Ok)
        }
        Err(err) if err.is_rate_limited() => Err(CrewError::Preflight(format!(
            "model API quota exceeded; check billing and quota limits ({})",
            describe(&err)
        ))),
        Err(err) => {
            let reason = describe(&err);
            warn!("model API test failed, continuing: {reason}");
            Ok(ConnectionStatus::Degraded(reason))
        }
    }
}

fn describe<E>(err: &RetryError<E>) -> String {
    err.last_error()
        .map(|record| record.message.clone())
        .unwrap_or_else(|| err.to_string())
}

/// Advice for working within a small API quota.
pub fn quota_tips() -> String {
    let rule = "=".repeat(50);
    [
        "QUOTA MANAGEMENT TIPS:".to_string(),
        rule.clone(),
        "1. Check your Gemini API quota at: https://aistudio.google.com/app/apikey".to_string(),
        "2. Consider upgrading your plan for higher limits".to_string(),
        "3. Run tasks sequentially rather than in parallel".to_string(),
        "4. Reduce `model.max_output_tokens` to conserve quota".to_string(),
        "5. Skip optional work with --skip-industry-analysis".to_string(),
        "6. Test with smaller inputs first".to_string(),
        rule,
    ]
    .join("\n")
}
