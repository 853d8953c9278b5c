use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricflowConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How lines are laid out around the current one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Silence (seconds) before a line that earns it extra spacing
    #[serde(default = "default_large_gap_secs")]
    pub large_gap_secs: f64,
    /// Opacity lost per line of distance from the current line
    #[serde(default = "default_opacity_step")]
    pub opacity_step: f64,
    /// Floor for faded lines
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    #[serde(default = "default_lines_before")]
    pub lines_before: usize,
    #[serde(default = "default_lines_after")]
    pub lines_after: usize,
}

const fn default_large_gap_secs() -> f64 {
    2.0
}

const fn default_opacity_step() -> f64 {
    0.25
}

const fn default_min_opacity() -> f64 {
    0.1
}

const fn default_lines_before() -> usize {
    1
}

const fn default_lines_after() -> usize {
    2
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            large_gap_secs: default_large_gap_secs(),
            opacity_step: default_opacity_step(),
            min_opacity: default_min_opacity(),
            lines_before: default_lines_before(),
            lines_after: default_lines_after(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interval between playback clock ticks
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

const fn default_tick_ms() -> u64 {
    100
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl LyricflowConfig {
    /// Get the config file path (~/.config/lyricflow/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create a template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing a template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `config_path` or write a template there if missing
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing a template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;
            info!("Wrote config template to {}", config_path.display());

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate config from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;

        if display.large_gap_secs.is_nan() || display.large_gap_secs < 0.0 {
            return Err(invalid("display.large_gap_secs must be zero or greater"));
        }
        if display.opacity_step.is_nan() || display.opacity_step <= 0.0 {
            return Err(invalid("display.opacity_step must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&display.min_opacity) {
            return Err(invalid("display.min_opacity must be between 0 and 1"));
        }
        if self.playback.tick_ms == 0 {
            return Err(invalid("playback.tick_ms must be greater than zero"));
        }
        if self.playback.tick_ms > 1000 {
            warn!(
                "playback.tick_ms = {} will make word highlighting lag noticeably",
                self.playback.tick_ms
            );
        }

        Ok(())
    }
}

fn invalid(message: &str) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.to_string(),
    }
}

/// Template written on first run
pub const CONFIG_TEMPLATE: &str = r"# Lyricflow Configuration
# ~/.config/lyricflow/config.toml

[display]
# Seconds of silence before a line that add extra spacing above it
large_gap_secs = 2.0
# Opacity lost per line away from the current line, and the lowest it can go
opacity_step = 0.25
min_opacity = 0.1
# Lines shown around the current line
lines_before = 1
lines_after = 2

[playback]
# Playback clock tick interval in milliseconds
tick_ms = 100

[logging]
# Also write logs to lyricflow.log in the cache directory
enabled = false
";
