//! Configuration resolution for clipcheck-engine
//!
//! Resolves every engine setting with ENV → TOML priority. Credentials are
//! required and fail with guidance on where to put them; timing and fan-out
//! limits fall back to compiled defaults.

use clipcheck_common::config::TomlConfig;
use clipcheck_common::{Error, Result};
use std::time::Duration;
use tracing::warn;

/// Default overall per-job deadline
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);
/// Default per-phase timeout
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(120);
/// Default per-claim fact-check timeout
pub const DEFAULT_FACTCHECK_TIMEOUT: Duration = Duration::from_secs(45);
/// Default maximum concurrently in-flight claim fact-checks
pub const DEFAULT_MAX_CONCURRENT_FACTCHECKS: usize = 4;
/// Default maximum web results fetched per claim
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 5;
/// Default text-analysis model
pub const DEFAULT_TEXT_MODEL: &str = "forensic-text-1";
/// Default multimodal judgment model
pub const DEFAULT_VIDEO_MODEL: &str = "forensic-video-1";

/// Fully-resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Video-understanding service base URL
    pub understanding_url: String,
    /// Video-understanding service API key
    pub understanding_api_key: String,
    /// Language-model service base URL
    pub model_url: String,
    /// Language-model service API key
    pub model_api_key: String,
    /// Text-analysis model name
    pub text_model: String,
    /// Multimodal judgment model name
    pub video_model: String,
    /// Web-search service base URL
    pub search_url: String,
    /// Web-search service API key
    pub search_api_key: String,
    /// Overall per-job deadline
    pub job_timeout: Duration,
    /// Per-phase timeout
    pub phase_timeout: Duration,
    /// Per-claim fact-check timeout
    pub factcheck_timeout: Duration,
    /// Maximum concurrently in-flight claim fact-checks
    pub max_concurrent_factchecks: usize,
    /// Maximum web results fetched per claim
    pub max_search_results: usize,
}

impl EngineConfig {
    /// Resolve the engine configuration from environment and TOML
    ///
    /// **Priority:** ENV → TOML. Missing credentials produce a
    /// `Error::Config` naming both places the value may be supplied.
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        let services = &toml_config.services;
        let limits = &toml_config.limits;

        Ok(Self {
            understanding_url: require(
                "CLIPCHECK_UNDERSTANDING_URL",
                services.understanding_url.as_deref(),
                "services.understanding_url",
            )?,
            understanding_api_key: require(
                "CLIPCHECK_UNDERSTANDING_API_KEY",
                services.understanding_api_key.as_deref(),
                "services.understanding_api_key",
            )?,
            model_url: require(
                "CLIPCHECK_MODEL_URL",
                services.model_url.as_deref(),
                "services.model_url",
            )?,
            model_api_key: require(
                "CLIPCHECK_MODEL_API_KEY",
                services.model_api_key.as_deref(),
                "services.model_api_key",
            )?,
            text_model: optional(
                "CLIPCHECK_TEXT_MODEL",
                services.text_model.as_deref(),
            )
            .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            video_model: optional(
                "CLIPCHECK_VIDEO_MODEL",
                services.video_model.as_deref(),
            )
            .unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            search_url: require(
                "CLIPCHECK_SEARCH_URL",
                services.search_url.as_deref(),
                "services.search_url",
            )?,
            search_api_key: require(
                "CLIPCHECK_SEARCH_API_KEY",
                services.search_api_key.as_deref(),
                "services.search_api_key",
            )?,
            job_timeout: limits
                .job_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_JOB_TIMEOUT),
            phase_timeout: limits
                .phase_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PHASE_TIMEOUT),
            factcheck_timeout: limits
                .factcheck_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FACTCHECK_TIMEOUT),
            max_concurrent_factchecks: limits
                .max_concurrent_factchecks
                .unwrap_or(DEFAULT_MAX_CONCURRENT_FACTCHECKS)
                .max(1),
            max_search_results: limits
                .max_search_results
                .unwrap_or(DEFAULT_MAX_SEARCH_RESULTS)
                .max(1),
        })
    }
}

/// Validate a setting value (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Resolve an optional setting with ENV → TOML priority
fn optional(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_value(v));
    let toml_value = toml_value.filter(|v| is_valid_value(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} set in both environment and TOML; using environment (highest priority)",
            env_var
        );
    }

    env_value.or_else(|| toml_value.map(str::to_string))
}

/// Resolve a required setting with ENV → TOML priority
fn require(env_var: &str, toml_value: Option<&str>, toml_key: &str) -> Result<String> {
    optional(env_var, toml_value).ok_or_else(|| {
        Error::Config(format!(
            "{} not configured. Supply it using one of:\n\
             1. Environment: {}=...\n\
             2. TOML config: ~/.config/clipcheck/config.toml ({} = \"...\")",
            toml_key, env_var, toml_key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcheck_common::config::TomlConfig;
    use serial_test::serial;

    fn full_toml() -> TomlConfig {
        let mut config = TomlConfig::default();
        config.services.understanding_url = Some("https://video.example.com/v1".into());
        config.services.understanding_api_key = Some("tl-key".into());
        config.services.model_url = Some("https://llm.example.com/v1".into());
        config.services.model_api_key = Some("llm-key".into());
        config.services.search_url = Some("https://search.example.com".into());
        config.services.search_api_key = Some("search-key".into());
        config
    }

    fn clear_env() {
        for var in [
            "CLIPCHECK_UNDERSTANDING_URL",
            "CLIPCHECK_UNDERSTANDING_API_KEY",
            "CLIPCHECK_MODEL_URL",
            "CLIPCHECK_MODEL_API_KEY",
            "CLIPCHECK_TEXT_MODEL",
            "CLIPCHECK_VIDEO_MODEL",
            "CLIPCHECK_SEARCH_URL",
            "CLIPCHECK_SEARCH_API_KEY",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_resolve_from_toml_with_defaults() {
        clear_env();
        let config = EngineConfig::resolve(&full_toml()).unwrap();

        assert_eq!(config.understanding_api_key, "tl-key");
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.job_timeout, DEFAULT_JOB_TIMEOUT);
        assert_eq!(
            config.max_concurrent_factchecks,
            DEFAULT_MAX_CONCURRENT_FACTCHECKS
        );
    }

    #[test]
    #[serial]
    fn test_env_wins_over_toml() {
        clear_env();
        std::env::set_var("CLIPCHECK_MODEL_API_KEY", "env-key");
        let config = EngineConfig::resolve(&full_toml()).unwrap();
        std::env::remove_var("CLIPCHECK_MODEL_API_KEY");

        assert_eq!(config.model_api_key, "env-key");
    }

    #[test]
    #[serial]
    fn test_missing_credential_names_both_sources() {
        clear_env();
        let mut toml = full_toml();
        toml.services.search_api_key = None;

        let err = EngineConfig::resolve(&toml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("CLIPCHECK_SEARCH_API_KEY"));
        assert!(message.contains("services.search_api_key"));
    }

    #[test]
    #[serial]
    fn test_whitespace_credential_rejected() {
        clear_env();
        let mut toml = full_toml();
        toml.services.model_api_key = Some("   ".into());

        assert!(EngineConfig::resolve(&toml).is_err());
    }

    #[test]
    #[serial]
    fn test_limit_overrides() {
        clear_env();
        let mut toml = full_toml();
        toml.limits.job_timeout_secs = Some(300);
        toml.limits.max_concurrent_factchecks = Some(0);

        let config = EngineConfig::resolve(&toml).unwrap();
        assert_eq!(config.job_timeout, Duration::from_secs(300));
        // A zero fan-out limit would deadlock the checker; floor at 1
        assert_eq!(config.max_concurrent_factchecks, 1);
    }
}
