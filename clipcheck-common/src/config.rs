//! Configuration file loading
//!
//! clipcheck reads a single TOML file; each setting can also be supplied via a
//! `CLIPCHECK_*` environment variable, which wins over the file (resolution
//! lives in the engine crate). This module owns the file shape and the
//! platform-dependent lookup path.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    /// Log filter directive (e.g. "info", "clipcheck_engine=debug")
    pub level: Option<String>,
}

/// External service endpoints and credentials
///
/// All fields optional in the file; the engine rejects a job configuration
/// that is missing a credential it needs, with guidance on where to put it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Video-understanding service base URL
    pub understanding_url: Option<String>,
    /// Video-understanding service API key
    pub understanding_api_key: Option<String>,
    /// Language-model service base URL
    pub model_url: Option<String>,
    /// Language-model service API key
    pub model_api_key: Option<String>,
    /// Text-analysis model name (claims, fact-checks, timeline)
    pub text_model: Option<String>,
    /// Multimodal model name (AI-generation judgment)
    pub video_model: Option<String>,
    /// Web-search service base URL
    pub search_url: Option<String>,
    /// Web-search service API key
    pub search_api_key: Option<String>,
}

/// Pipeline timing and fan-out limits, all optional in the file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LimitsConfig {
    /// Overall per-job deadline in seconds
    pub job_timeout_secs: Option<u64>,
    /// Per-phase timeout in seconds (applies to each analysis phase)
    pub phase_timeout_secs: Option<u64>,
    /// Per-claim fact-check timeout in seconds
    pub factcheck_timeout_secs: Option<u64>,
    /// Maximum concurrently in-flight claim fact-checks
    pub max_concurrent_factchecks: Option<usize>,
    /// Maximum web results fetched per claim
    pub max_search_results: Option<usize>,
}

/// clipcheck TOML configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub services: ServiceConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Get the platform configuration file path
///
/// Linux: `~/.config/clipcheck/config.toml`, falling back to
/// `/etc/clipcheck/config.toml`. macOS/Windows: the OS config directory.
pub fn default_config_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        if let Some(path) = dirs::config_dir().map(|d| d.join("clipcheck").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/clipcheck/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("clipcheck").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// Load and parse a TOML configuration file
pub fn load_toml_config(path: &std::path::Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the configuration from the default path, or return defaults when no
/// file exists (everything may still come from the environment).
pub fn load_default_config() -> TomlConfig {
    match default_config_path() {
        Ok(path) => match load_toml_config(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration file");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                TomlConfig::default()
            }
        },
        Err(_) => TomlConfig::default(),
    }
}

/// Write a TOML configuration file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Create config dir failed: {}", e)))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content).map_err(|e| Error::Config(format!("Write TOML failed: {}", e)))
}

/// Standard User-Agent string for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!(
        "clipcheck/{} (+https://github.com/clipcheck/clipcheck)",
        env!("CARGO_PKG_VERSION")
    )
}
