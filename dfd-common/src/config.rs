//! Bootstrap configuration loading
//!
//! Settings sources priority:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`DFD_BACKEND_URL`, `DFD_PORT`, `DFD_CONFIG`)
//! 3. TOML configuration file
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: a warning is
//! logged and compiled defaults are used.

use crate::time::millis_to_duration;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DFD_CONFIG";
/// Environment variable overriding the classification endpoint
pub const BACKEND_URL_ENV_VAR: &str = "DFD_BACKEND_URL";
/// Environment variable overriding the HTTP port
pub const PORT_ENV_VAR: &str = "DFD_PORT";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Classification endpoint (POST `{ "image": <path> }`)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// HTTP port for the dashboard service
    #[serde(default = "default_port")]
    pub port: u16,

    /// Show the busy overlay while a classification request is in flight
    #[serde(default = "default_show_busy_overlay")]
    pub show_busy_overlay: bool,

    /// EventBus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Transition and request timing
    #[serde(default)]
    pub timing: TimingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Delays and timeouts, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between navigation start and panel activation
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,

    /// How long a closing overlay message stays visible
    #[serde(default = "default_overlay_hide_delay_ms")]
    pub overlay_hide_delay_ms: u64,

    /// How long the boot splash stays visible
    #[serde(default = "default_splash_delay_ms")]
    pub splash_delay_ms: u64,

    /// Per-request classification timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000/check".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_show_busy_overlay() -> bool {
    true
}

fn default_event_capacity() -> usize {
    100
}

fn default_transition_delay_ms() -> u64 {
    1000
}

fn default_overlay_hide_delay_ms() -> u64 {
    800
}

fn default_splash_delay_ms() -> u64 {
    4200
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            port: default_port(),
            show_busy_overlay: default_show_busy_overlay(),
            event_capacity: default_event_capacity(),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_delay_ms: default_transition_delay_ms(),
            overlay_hide_delay_ms: default_overlay_hide_delay_ms(),
            splash_delay_ms: default_splash_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TimingConfig {
    pub fn transition_delay(&self) -> Duration {
        millis_to_duration(self.transition_delay_ms)
    }

    pub fn overlay_hide_delay(&self) -> Duration {
        millis_to_duration(self.overlay_hide_delay_ms)
    }

    pub fn splash_delay(&self) -> Duration {
        millis_to_duration(self.splash_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        millis_to_duration(self.request_timeout_ms)
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/dfd/dfd-dash.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dfd").join("dfd-dash.toml"))
}

/// Read and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Serialize configuration to a TOML file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub port: Option<u16>,
}

/// Resolves the effective configuration from CLI, environment, TOML and defaults
pub struct ConfigResolver {
    overrides: ConfigOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }

    /// Config file to read: CLI path, then `DFD_CONFIG`, then platform default
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.overrides.config_path {
            return Some(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        default_config_path()
    }

    /// Resolve the effective configuration
    ///
    /// Never fails: unreadable or invalid files degrade to defaults with a warning.
    pub fn resolve(&self) -> TomlConfig {
        let resolved = self.resolve_with_warnings();
        for warning in &resolved.warnings {
            warn!("{}", warning);
        }
        resolved.config
    }

    /// Resolve without logging, returning the degradation warnings
    ///
    /// For callers that set up tracing from the resolved configuration and
    /// log the warnings once the subscriber exists.
    pub fn resolve_with_warnings(&self) -> ResolvedConfig {
        let mut warnings = Vec::new();

        let mut config = match self.config_path() {
            Some(path) if path.exists() => match load_toml_config(&path) {
                Ok(config) => config,
                Err(e) => {
                    warnings.push(format!("{}; using compiled defaults", e));
                    TomlConfig::default()
                }
            },
            Some(_) => TomlConfig::default(),
            None => {
                warnings.push(
                    "Could not determine config directory; using compiled defaults".to_string(),
                );
                TomlConfig::default()
            }
        };

        // Backend URL: CLI > ENV > TOML
        if let Some(url) = &self.overrides.backend_url {
            config.backend_url = url.clone();
        } else if let Ok(url) = std::env::var(BACKEND_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                config.backend_url = url;
            }
        }

        // Port: CLI > ENV > TOML
        if let Some(port) = self.overrides.port {
            config.port = port;
        } else if let Ok(raw) = std::env::var(PORT_ENV_VAR) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warnings.push(format!("Ignoring invalid {}='{}'", PORT_ENV_VAR, raw)),
            }
        }

        ResolvedConfig { config, warnings }
    }
}

/// Effective configuration plus the warnings raised while resolving it
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: TomlConfig,
    pub warnings: Vec<String>,
}
