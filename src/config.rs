//! Configuration parsing and validation for modelmux.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use crate::catalog::{Catalog, ModelDescriptor};

/// Convention env var consulted when no api_key appears in config.
pub const CONVENTION_KEY_VAR: &str = "MODELMUX_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    /// Catalog override; empty means "use the built-in catalog".
    pub models: Vec<ModelDescriptor>,
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Upstream provider configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the OpenAI-compatible provider.
    pub url: String,
    /// Optional API key.
    pub api_key: Option<ApiKey>,
    /// Meta-model queried to pick the backend for each prompt.
    pub selector_model: String,
    /// Model used when selection fails for any reason.
    pub fallback_model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

fn default_upstream_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_selector_model() -> String {
    "openai/gpt-oss-20b:free".to_string()
}

fn default_fallback_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            api_key: None,
            selector_model: default_selector_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
///
/// The inner `SecretString` ensures the key value is:
/// - Zeroized in memory when dropped
/// - Never exposed via Debug or Display
/// - Only accessible via `.expose_secret()` (grep-auditable)
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Access the raw key value. Every call site is auditable via `grep expose_secret`.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> serde::Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ApiKey(SecretString::from(s)))
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How the upstream API key was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Key was a literal string in config (no ${} references)
    Literal,
    /// Key contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Key was auto-discovered from the convention env var
    Convention,
    /// No key available
    None,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Literal => write!(f, "config-literal"),
            KeySource::EnvExpanded => write!(f, "env-expanded"),
            KeySource::Convention => write!(f, "convention ({})", CONVENTION_KEY_VAR),
            KeySource::None => write!(f, "none"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Raw upstream config deserialized directly from TOML.
/// api_key is `Option<String>` so it may contain `${VAR}` references not yet expanded.
#[derive(Deserialize)]
struct RawUpstreamConfig {
    #[serde(default = "default_upstream_url")]
    url: String,
    api_key: Option<String>,
    #[serde(default = "default_selector_model")]
    selector_model: String,
    #[serde(default = "default_fallback_model")]
    fallback_model: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
}

impl Default for RawUpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            api_key: None,
            selector_model: default_selector_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Raw configuration deserialized directly from TOML.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    upstream: RawUpstreamConfig,
    #[serde(default)]
    models: Vec<ModelDescriptor>,
    #[serde(default)]
    logging: LoggingConfig,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' not set: {message}")]
    EnvVar { var: String, message: String },
}

/// Expand all `${VAR}` references in a string using a custom lookup function.
///
/// The closure-based design makes this testable without touching global env state.
/// Fails on first missing variable, unclosed `${`, or empty variable name.
fn expand_env_vars_with<F>(input: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after.find('}').ok_or_else(|| ConfigError::EnvVar {
            var: "<unclosed>".to_string(),
            message: format!("Unclosed '${{' in config value: {}", input),
        })?;

        let var_name = &after[..end];
        if var_name.is_empty() {
            return Err(ConfigError::EnvVar {
                var: "".to_string(),
                message: "Empty variable name in '${}' reference".to_string(),
            });
        }

        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVar {
            var: var_name.to_string(),
            message: format!("Environment variable '{}' is not set", var_name),
        })?;

        result.push_str(&value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

impl Config {
    /// Load configuration from a TOML file with environment variable expansion.
    ///
    /// Returns the config and how the upstream API key was resolved.
    pub fn from_file(path: impl AsRef<Path>) -> Result<(Self, KeySource), ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse_with(&content, |name| std::env::var(name).ok())
    }

    /// Parse configuration from a TOML string using a custom env lookup.
    ///
    /// Key resolution order:
    /// - `api_key` containing `${VAR}`: expand from lookup, source = `EnvExpanded`
    /// - `api_key` as a literal string: wrap directly, source = `Literal`
    /// - `api_key` absent: consult `MODELMUX_API_KEY`, source = `Convention` or `None`
    pub fn parse_with<F>(content: &str, lookup: F) -> Result<(Self, KeySource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = toml::from_str(content)?;

        let (api_key, key_source) = match raw.upstream.api_key {
            Some(ref raw_key) if raw_key.contains("${") => {
                let expanded = expand_env_vars_with(raw_key, &lookup)?;
                (Some(ApiKey::from(expanded)), KeySource::EnvExpanded)
            }
            Some(ref raw_key) => (Some(ApiKey::from(raw_key.as_str())), KeySource::Literal),
            None => match lookup(CONVENTION_KEY_VAR) {
                Some(value) => (Some(ApiKey::from(value)), KeySource::Convention),
                None => (None, KeySource::None),
            },
        };

        let config = Config {
            server: raw.server,
            upstream: UpstreamConfig {
                url: raw.upstream.url,
                api_key,
                selector_model: raw.upstream.selector_model,
                fallback_model: raw.upstream.fallback_model,
                timeout_secs: raw.upstream.timeout_secs,
                connect_timeout_secs: raw.upstream.connect_timeout_secs,
            },
            models: raw.models,
            logging: raw.logging,
        };

        config.validate()?;
        Ok((config, key_source))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.url.is_empty() {
            return Err(ConfigError::Validation("Upstream URL is empty".to_string()));
        }
        if self.upstream.selector_model.is_empty() {
            return Err(ConfigError::Validation(
                "Selector model is empty".to_string(),
            ));
        }
        if self.upstream.fallback_model.is_empty() {
            return Err(ConfigError::Validation(
                "Fallback model is empty".to_string(),
            ));
        }

        for model in &self.models {
            if model.name.is_empty() {
                return Err(ConfigError::Validation(
                    "Catalog entry has empty name".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The model catalog: config entries when present, else the built-in list.
    pub fn catalog(&self) -> Catalog {
        if self.models.is_empty() {
            Catalog::default()
        } else {
            Catalog::new(self.models.clone())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            models: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}
