//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`JOBCREW_*`, plus the key variables named by
//!    `model.api_key_env` / `search.api_key_env`, `GOOGLE_API_KEY` and
//!    `SERPER_API_KEY` by default)
//! 2. TOML file specified via --config CLI flag
//! 3. ./jobcrew.toml in the current directory
//! 4. $XDG_CONFIG_HOME/jobcrew/jobcrew.toml (or the platform equivalent)
//! 5. Built-in defaults
//!
//! The result is an immutable value handed to the crew at startup; nothing
//! reads configuration lazily afterwards.

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use loader::{load_config, load_config_with_source};
pub use types::{
    Config, ConfigSource, CrewConfig, LoadedConfig, ModelConfig, NetworkConfig, RetrySettings,
    SearchConfig,
};

#[cfg(test)]
mod tests {
    use super::loader::load_config_from_sources;
    use super::*;
    use crate::error::ConfigError;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn load_with(
        path_override: Option<&str>,
        files: &[(&str, &str)],
        env: &[(&str, &str)],
    ) -> Result<LoadedConfig, ConfigError> {
        let files: HashMap<PathBuf, String> = files
            .iter()
            .map(|(path, text)| (PathBuf::from(path), text.to_string()))
            .collect();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from_sources(
            path_override,
            |path: &Path| {
                files.get(path).cloned().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing fixture")
                })
            },
            |name| env.get(name).cloned(),
            || Some(PathBuf::from("/home/test/.config")),
        )
    }

    #[test]
    fn no_files_yields_builtin_defaults() {
        let loaded = load_with(None, &[], &[]).expect("defaults load");
        assert_eq!(loaded.source, ConfigSource::BuiltInDefaults);
        let cfg = loaded.config;
        assert_eq!(cfg.model.model, "gemini-1.5-flash");
        assert_eq!(cfg.model.max_output_tokens, 800);
        assert_eq!(cfg.search.endpoint, "https://google.serper.dev/search");
        assert_eq!(cfg.retry, RetrySettings::default());
        assert!(cfg.crew.include_industry_analysis);
        assert!(cfg.model.api_key.is_empty());
    }

    #[test]
    fn local_file_wins_over_global() {
        let loaded = load_with(
            None,
            &[
                ("jobcrew.toml", "[model]\nmodel = \"local-model\"\n"),
                (
                    "/home/test/.config/jobcrew/jobcrew.toml",
                    "[model]\nmodel = \"global-model\"\n",
                ),
            ],
            &[],
        )
        .expect("load");
        assert_eq!(loaded.config.model.model, "local-model");
        assert_eq!(
            loaded.source,
            ConfigSource::Local(PathBuf::from("jobcrew.toml"))
        );
    }

    #[test]
    fn global_file_is_used_when_no_local_file() {
        let loaded = load_with(
            None,
            &[(
                "/home/test/.config/jobcrew/jobcrew.toml",
                "[crew]\nverbose = true\n",
            )],
            &[],
        )
        .expect("load");
        assert!(loaded.config.crew.verbose);
        assert!(matches!(loaded.source, ConfigSource::Global(_)));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_with(Some("missing.toml"), &[], &[]).expect_err("should fail");
        assert!(matches!(err, ConfigError::Io(_)), "got: {err}");
    }

    #[test]
    fn retry_section_builds_policy() {
        let text = r#"
[retry]
base_delay_secs = 0.5
max_delay_secs = 4.0
rate_limit_delay_secs = 10
max_retries = 3
backoff_multiplier = 3.0
jitter_max_secs = 0
backoff_after_rate_limit = false
"#;
        let loaded = load_with(Some("custom.toml"), &[("custom.toml", text)], &[]).expect("load");
        let policy = loaded.config.retry_policy().expect("valid policy");
        assert_eq!(policy.base_delay(), Duration::from_millis(500));
        assert_eq!(policy.max_delay(), Duration::from_secs(4));
        assert_eq!(policy.rate_limit_delay(), Duration::from_secs(10));
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.backoff_multiplier(), 3.0);
        assert_eq!(policy.jitter_max(), Duration::ZERO);
        assert!(!policy.backoff_after_rate_limit());
    }

    #[test]
    fn invalid_retry_values_are_rejected() {
        for (text, needle) in [
            ("[retry]\nmax_retries = 0\n", "max_retries"),
            ("[retry]\nbackoff_multiplier = 1.0\n", "backoff_multiplier"),
            ("[retry]\nbase_delay_secs = 0\n", "base_delay_secs"),
            ("[retry]\nbase_delay_secs = -1\n", "base_delay_secs"),
            ("[retry]\nmax_delay_secs = 1.0\n", "max_delay_secs"),
            ("[retry]\njitter_max_secs = -0.5\n", "jitter_max_secs"),
        ] {
            let err = load_with(Some("bad.toml"), &[("bad.toml", text)], &[])
                .expect_err("invalid retry settings");
            let msg = err.to_string();
            assert!(msg.contains(needle), "{text:?} -> {msg}");
        }
    }

    #[test]
    fn env_overrides_apply_after_file() {
        let loaded = load_with(
            None,
            &[("jobcrew.toml", "[retry]\nmax_retries = 2\n")],
            &[
                ("JOBCREW_MAX_RETRIES", "7"),
                ("JOBCREW_MODEL", "gemini-2.0-flash"),
                ("JOBCREW_RATE_LIMIT_DELAY_SECS", "60"),
            ],
        )
        .expect("load");
        assert_eq!(loaded.config.retry.max_retries, 7);
        assert_eq!(loaded.config.retry.rate_limit_delay_secs, 60.0);
        assert_eq!(loaded.config.model.model, "gemini-2.0-flash");
    }

    #[test]
    fn malformed_env_number_is_an_error() {
        let err = load_with(None, &[], &[("JOBCREW_MAX_RETRIES", "many")])
            .expect_err("should fail");
        assert!(err.to_string().contains("JOBCREW_MAX_RETRIES"), "got: {err}");
    }

    #[test]
    fn api_keys_resolve_from_env_unless_inline() {
        let loaded = load_with(
            None,
            &[("jobcrew.toml", "[search]\napi_key = \"inline-serper\"\n")],
            &[("GOOGLE_API_KEY", " g-key \n"), ("SERPER_API_KEY", "env-serper")],
        )
        .expect("load");
        assert_eq!(loaded.config.model.api_key, "g-key");
        assert_eq!(loaded.config.search.api_key, "inline-serper");
    }

    #[test]
    fn custom_key_env_name_is_honoured() {
        let text = "[model]\napi_key_env = \"MY_GEMINI_KEY\"\n";
        let loaded = load_with(
            Some("c.toml"),
            &[("c.toml", text)],
            &[("MY_GEMINI_KEY", "custom"), ("GOOGLE_API_KEY", "default")],
        )
        .expect("load");
        assert_eq!(loaded.config.model.api_key, "custom");
    }

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::BuiltInDefaults.to_string(), "built-in defaults");
        assert_eq!(
            ConfigSource::Explicit(PathBuf::from("a/b.toml")).to_string(),
            "a/b.toml"
        );
    }
}
