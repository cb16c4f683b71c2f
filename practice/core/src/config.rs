//! TOML Configuration File Support
//!
//! Configuration for a practice session, read from
//! `~/.config/yogaflow/practice.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`YOGAFLOW_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! Practice settings from any layer are clamped into their allowed ranges;
//! an out-of-range value never fails loading.
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api.yogaflow.app/v1"
//! timeout_secs = 10
//! offline = false
//!
//! [practice]
//! preparation_time_secs = 10
//! transition_warning_secs = 5
//! volume = 0.8
//! lead_in = false
//! start_muted = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{SettingUpdate, Settings};

/// Default API request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

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

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the sequence and session API
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Use the built-in catalog and skip the network entirely
    pub offline: Option<bool>,
}

/// Practice section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeToml {
    /// Lead-in before the first pose, in seconds
    pub preparation_time_secs: Option<u32>,

    /// Warning window before each transition, in seconds
    pub transition_warning_secs: Option<u32>,

    /// Cue volume in `[0, 1]`
    pub volume: Option<f32>,

    /// Count down the preparation time before the first pose
    pub lead_in: Option<bool>,

    /// Start with cues muted
    pub start_muted: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YogaflowToml {
    /// API configuration section
    pub api: ApiToml,

    /// Practice configuration section
    pub practice: PracticeToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for a practice session
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct PracticeConfig {
    /// API base URL (`None` means no server is configured)
    pub base_url: Option<String>,

    /// API request timeout
    pub timeout: Duration,

    /// Use the built-in catalog instead of the API
    pub offline: bool,

    /// Initial practice settings
    pub settings: Settings,

    /// Count down the preparation time before the first pose
    pub lead_in: bool,

    /// Start with cues muted
    pub start_muted: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            offline: false,
            settings: Settings::default(),
            lead_in: false,
            start_muted: false,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PracticeConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Whether sequences should come from the built-in catalog
    ///
    /// True when offline mode is on or no API is configured.
    #[must_use]
    pub fn use_catalog(&self) -> bool {
        self.offline || self.base_url.is_none()
    }

    /// Check values that cannot be clamped
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero timeout or a base
    /// URL that is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "api timeout must be at least one second".to_string(),
            ));
        }
        if let Some(ref url) = self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "api base_url must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }

    fn update_setting(&mut self, update: SettingUpdate) {
        if self.settings.apply(update) {
            tracing::warn!(
                key = %update.key(),
                "Configured value out of range; clamped"
            );
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/yogaflow/practice.toml` or
/// `~/.config/yogaflow/practice.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("yogaflow").join("practice.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] after.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<PracticeConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PracticeConfig, ConfigError> {
    let mut config = load_file_layer(path)?;
    apply_env_config(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Defaults plus the config file, without the environment layer
fn load_file_layer(path: Option<PathBuf>) -> Result<PracticeConfig, ConfigError> {
    let mut config = PracticeConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: YogaflowToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
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

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PracticeConfig, toml: &YogaflowToml) {
    // API settings
    if let Some(ref url) = toml.api.base_url {
        config.base_url = Some(url.clone());
    }
    if let Some(secs) = toml.api.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(offline) = toml.api.offline {
        config.offline = offline;
    }

    // Practice settings
    if let Some(secs) = toml.practice.preparation_time_secs {
        config.update_setting(SettingUpdate::PreparationTime(secs));
    }
    if let Some(secs) = toml.practice.transition_warning_secs {
        config.update_setting(SettingUpdate::TransitionWarning(secs));
    }
    if let Some(volume) = toml.practice.volume {
        config.update_setting(SettingUpdate::Volume(volume));
    }
    if let Some(lead_in) = toml.practice.lead_in {
        config.lead_in = lead_in;
    }
    if let Some(muted) = toml.practice.start_muted {
        config.start_muted = muted;
    }
}

fn parse_flag(value: &str) -> bool {
    value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; production passes `std::env::var`.
fn apply_env_config<F>(config: &mut PracticeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // API settings from environment
    if let Some(url) = lookup("YOGAFLOW_API_URL") {
        config.base_url = Some(url);
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = lookup("YOGAFLOW_API_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(offline) = lookup("YOGAFLOW_OFFLINE") {
        config.offline = parse_flag(&offline);
        config.source = ConfigSource::Env;
    }

    // Practice settings from environment
    if let Some(secs) = lookup("YOGAFLOW_PREPARATION_SECS") {
        if let Ok(secs) = secs.parse::<u32>() {
            config.update_setting(SettingUpdate::PreparationTime(secs));
            config.source = ConfigSource::Env;
        }
    }
    if let Some(secs) = lookup("YOGAFLOW_WARNING_SECS") {
        if let Ok(secs) = secs.parse::<u32>() {
            config.update_setting(SettingUpdate::TransitionWarning(secs));
            config.source = ConfigSource::Env;
        }
    }
    if let Some(volume) = lookup("YOGAFLOW_VOLUME") {
        if let Ok(volume) = volume.parse::<f32>() {
            config.update_setting(SettingUpdate::Volume(volume));
            config.source = ConfigSource::Env;
        }
    }
    if let Some(lead_in) = lookup("YOGAFLOW_LEAD_IN") {
        config.lead_in = parse_flag(&lead_in);
        config.source = ConfigSource::Env;
    }
    if let Some(muted) = lookup("YOGAFLOW_MUTED") {
        config.start_muted = parse_flag(&muted);
        config.source = ConfigSource::Env;
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
    /// API base URL override
    pub base_url: Option<String>,

    /// Offline mode override
    pub offline: Option<bool>,

    /// Transition warning override (seconds)
    pub transition_warning_secs: Option<u32>,

    /// Volume override
    pub volume: Option<f32>,

    /// Lead-in override
    pub lead_in: Option<bool>,

    /// Start-muted override
    pub start_muted: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set offline override
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = Some(offline);
        self
    }

    /// Set transition warning override
    #[must_use]
    pub fn with_transition_warning_secs(mut self, secs: u32) -> Self {
        self.transition_warning_secs = Some(secs);
        self
    }

    /// Set volume override
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set lead-in override
    #[must_use]
    pub fn with_lead_in(mut self, lead_in: bool) -> Self {
        self.lead_in = Some(lead_in);
        self
    }

    /// Set start-muted override
    #[must_use]
    pub fn with_start_muted(mut self, muted: bool) -> Self {
        self.start_muted = Some(muted);
        self
    }

    fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.offline.is_none()
            && self.transition_warning_secs.is_none()
            && self.volume.is_none()
            && self.lead_in.is_none()
            && self.start_muted.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut PracticeConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(offline) = self.offline {
            config.offline = offline;
        }
        if let Some(secs) = self.transition_warning_secs {
            config.update_setting(SettingUpdate::TransitionWarning(secs));
        }
        if let Some(volume) = self.volume {
            config.update_setting(SettingUpdate::Volume(volume));
        }
        if let Some(lead_in) = self.lead_in {
            config.lead_in = lead_in;
        }
        if let Some(muted) = self.start_muted {
            config.start_muted = muted;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
