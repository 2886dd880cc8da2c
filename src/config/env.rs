//! Environment overrides and API key resolution.

use std::str::FromStr;

use crate::error::ConfigError;

use super::Config;

/// Apply `JOBCREW_*` overrides on top of file/default values.
pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(env_lookup, "JOBCREW_BASE_URL") {
        config.model.base_url = url;
    }
    if let Some(model) = non_empty(env_lookup, "JOBCREW_MODEL") {
        config.model.model = model;
    }
    if let Some(value) = parse_env::<u32, _>(env_lookup, "JOBCREW_MAX_RETRIES", "integer")? {
        config.retry.max_retries = value;
    }
    if let Some(value) = parse_env::<f64, _>(env_lookup, "JOBCREW_BASE_DELAY_SECS", "seconds")? {
        config.retry.base_delay_secs = value;
    }
    if let Some(value) =
        parse_env::<f64, _>(env_lookup, "JOBCREW_RATE_LIMIT_DELAY_SECS", "seconds")?
    {
        config.retry.rate_limit_delay_secs = value;
    }
    Ok(())
}

/// Fill empty inline keys from their configured env vars.
pub(super) fn resolve_api_keys<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    config.model.api_key = resolve_key(&config.model.api_key, &config.model.api_key_env, env_lookup);
    config.search.api_key =
        resolve_key(&config.search.api_key, &config.search.api_key_env, env_lookup);
}

fn resolve_key<FEnv>(inline: &str, env_name: &str, env_lookup: &FEnv) -> String
where
    FEnv: Fn(&str) -> Option<String>,
{
    let inline = inline.trim();
    if !inline.is_empty() {
        return inline.to_string();
    }
    let env_name = env_name.trim();
    if env_name.is_empty() {
        return String::new();
    }
    non_empty(env_lookup, env_name).unwrap_or_default()
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T, FEnv>(env_lookup: &FEnv, name: &str, expected: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    FEnv: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(env_lookup, name) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| {
        ConfigError::Invalid(format!("invalid {name} value `{raw}`: expected {expected}"))
    })
}
