//! TOML Configuration File Support
//!
//! Client configuration lives in an optional TOML file at
//! `~/.config/report-chat/client.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/report-chat/client.toml` (typically `~/.config/report-chat/client.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "https://reports.example.com"
//! ws_path = "/ws"
//! request_timeout_secs = 120
//!
//! [session]
//! default_profile = "technical"
//! channel_capacity = 100
//! connect_timeout_ms = 5000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::Profile;

/// Environment variable overriding `server.base_url`
pub const ENV_SERVER: &str = "REPORT_CHAT_SERVER";
/// Environment variable overriding `session.default_profile`
pub const ENV_PROFILE: &str = "REPORT_CHAT_PROFILE";
/// Environment variable overriding `session.connect_timeout_ms`
pub const ENV_CONNECT_TIMEOUT: &str = "REPORT_CHAT_CONNECT_TIMEOUT";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Server section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// HTTP base URL of the report backend
    pub base_url: Option<String>,

    /// Path of the WebSocket chat endpoint
    pub ws_path: Option<String>,

    /// Timeout for HTTP requests in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Profile used when a session starts
    pub default_profile: Option<String>,

    /// Capacity of the transport channels
    pub channel_capacity: Option<usize>,

    /// Connection timeout in milliseconds
    pub connect_timeout_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Server configuration section
    pub server: ServerToml,

    /// Session configuration section
    pub session: SessionToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Where the backend lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP base URL, without trailing slash
    pub base_url: String,
    /// Path of the WebSocket chat endpoint
    pub ws_path: String,
    /// Timeout for HTTP requests (uploads can be slow)
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ws_path: "/ws".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// How sessions start and connect
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Profile used when a session starts
    pub default_profile: Profile,
    /// Capacity of the transport channels
    pub channel_capacity: usize,
    /// Limit on connect + handshake
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_profile: Profile::default(),
            channel_capacity: 100,
            connect_timeout: Duration::from_millis(5000),
        }
    }
}

/// Client configuration, merged from all sources
///
/// Use [`load_config`] to load with proper priority handling, then
/// [`ConfigOverrides::apply`] for command-line values.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend location
    pub server: ServerConfig,

    /// Session behaviour
    pub session: SessionConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// URL of an HTTP endpoint, e.g. `http_url("/reports")`
    #[must_use]
    pub fn http_url(&self, path: &str) -> String {
        join_url(&self.server.base_url, path)
    }

    /// URL of the WebSocket chat endpoint
    ///
    /// The scheme follows the base URL: `http` becomes `ws` and `https`
    /// becomes `wss`.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let base = self.server.base_url.as_str();
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        join_url(&ws_base, &self.server.ws_path)
    }

    /// Check that the merged values are usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for an unsupported URL scheme or
    /// a zero channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const SCHEMES: [&str; 2] = ["http://", "https://"];
        if !SCHEMES
            .iter()
            .any(|scheme| self.server.base_url.starts_with(scheme))
        {
            return Err(ConfigError::ValidationError(format!(
                "server.base_url must start with http:// or https://, got {:?}",
                self.server.base_url
            )));
        }
        if self.session.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "session.channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/report-chat/client.toml` or
/// `~/.config/report-chat/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("report-chat").join("client.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI arguments are not handled here; apply [`ConfigOverrides`] after.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged configuration is invalid. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the merged configuration is invalid.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = ClientConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Environment overrides file values
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) -> Result<(), ConfigError> {
    // Server settings
    if let Some(ref url) = toml.server.base_url {
        config.server.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ref path) = toml.server.ws_path {
        config.server.ws_path = path.clone();
    }
    if let Some(secs) = toml.server.request_timeout_secs {
        config.server.request_timeout = Duration::from_secs(secs);
    }

    // Session settings
    if let Some(ref name) = toml.session.default_profile {
        config.session.default_profile = name
            .parse::<Profile>()
            .map_err(|e| ConfigError::ValidationError(format!("session.default_profile: {e}")))?;
    }
    if let Some(capacity) = toml.session.channel_capacity {
        config.session.channel_capacity = capacity;
    }
    if let Some(ms) = toml.session.connect_timeout_ms {
        config.session.connect_timeout = Duration::from_millis(ms);
    }

    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ClientConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_SERVER) {
        config.server.base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Some(name) = env(ENV_PROFILE) {
        match name.parse::<Profile>() {
            Ok(profile) => {
                config.session.default_profile = profile;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring {}", ENV_PROFILE),
        }
    }
    if let Some(timeout) = env(ENV_CONNECT_TIMEOUT) {
        match timeout.parse::<u64>() {
            Ok(ms) => {
                config.session.connect_timeout = Duration::from_millis(ms);
                config.source = ConfigSource::Env;
            }
            Err(e) => {
                tracing::warn!(error = %e, value = %timeout, "Ignoring {}", ENV_CONNECT_TIMEOUT);
            }
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Default profile override
    pub default_profile: Option<Profile>,

    /// Connect timeout override (milliseconds)
    pub connect_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set default profile override
    #[must_use]
    pub fn with_default_profile(mut self, profile: Profile) -> Self {
        self.default_profile = Some(profile);
        self
    }

    /// Set connect timeout override
    #[must_use]
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.base_url.is_some()
            || self.default_profile.is_some()
            || self.connect_timeout_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.server.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(profile) = self.default_profile {
            config.session.default_profile = profile;
        }

        if let Some(ms) = self.connect_timeout_ms {
            config.session.connect_timeout = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
