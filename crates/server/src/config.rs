//! # Application Configuration
//!
//! This module defines the configuration structure for the `artmeta-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use artmeta::ProviderConfig;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The largest accepted request body. Images travel inline, so this is generous.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// When true, 500 responses carry the underlying error text instead of a generic message.
    #[serde(default)]
    pub expose_error_details: bool,
    /// Deadline for one generation, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// The AI provider used for generation.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Replaces the default user prompt template.
    #[serde(default)]
    pub prompt_override: Option<String>,
    /// Replaces the default system prompt.
    #[serde(default)]
    pub system_prompt_override: Option<String>,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Environment variables that seed the provider section when nothing else sets it.
const PROVIDER_ENV_DEFAULTS: [(&str, &str); 4] = [
    ("provider.provider", "AI_PROVIDER"),
    ("provider.api_key", "AI_API_KEY"),
    ("provider.api_url", "AI_API_URL"),
    ("provider.model_name", "AI_MODEL"),
];

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest precedence first:
/// 1. Defaults, including the provider seeded from `AI_PROVIDER`, `AI_API_KEY`,
///    `AI_API_URL` and `AI_MODEL`.
/// 2. The config file: `config_path_override`, or `config.yml` next to this crate if
///    present. `${VAR}` references are substituted from the environment.
/// 3. Top-level keys from the environment (e.g. `PORT`).
/// 4. Nested overrides from `ARTMETA_...` variables (e.g. `ARTMETA_PROVIDER__API_KEY`).
///
/// An explicit override path that does not exist is an error; a missing default
/// `config.yml` is not.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder();

    // Layer 1: Defaults seeded from the plain AI_* variables.
    for (key, var) in PROVIDER_ENV_DEFAULTS {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                builder = builder.set_default(key, value)?;
            }
        }
    }

    // Layer 2: Config file.
    let file_content = match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            Some(content)
        }
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            let content = read_and_substitute(&user_config_path)?;
            match &content {
                Some(_) => info!("Loading user-defined configuration from '{user_config_path}'."),
                None => info!("'{user_config_path}' not found. Using environment configuration only."),
            }
            content
        }
    };
    if let Some(content) = file_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default().try_parsing(true))
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("ARTMETA")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // `${VAR}` substitution leaves empty strings behind for unset variables.
    config.provider.api_key = none_if_blank(config.provider.api_key.take());
    config.provider.api_url = none_if_blank(config.provider.api_url.take());
    config.provider.model_name = none_if_blank(config.provider.model_name.take());
    config.prompt_override = none_if_blank(config.prompt_override.take());
    config.system_prompt_override = none_if_blank(config.system_prompt_override.take());

    Ok(config)
}
