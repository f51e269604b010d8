//! Rune motion configuration system
//!
//! This crate provides centralized configuration for the tweening engine and
//! its demo driver, loading settings from `rune.toml` with environment
//! variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RuneConfig {
    /// Animation defaults
    pub motion: MotionConfig,
    /// Demo driver settings
    pub demo: DemoConfig,
}

/// Defaults applied to animations that do not specify their own timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Duration in seconds when none is given
    pub default_duration_s: f64,
    /// Easing descriptor when none is given
    pub default_easing: String,
    /// Per-index delay increment in seconds for `stagger: true`
    pub stagger_step_s: f64,
    /// Interval between frames when the host drives a fixed-rate loop
    pub frame_interval_ms: f64,
}

/// Demo driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Stop after this many frames even if animations are still running
    pub frames: Option<u32>,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_duration_s: 0.5,
            default_easing: "linear".to_string(),
            stagger_step_s: 0.1,
            frame_interval_ms: 1000.0 / 60.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: None,
            log_filter: "info".to_string(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparsable values are ignored.
    pub fn merge_with_env(&mut self) {
        if let Some(duration) = parse_env::<f64>("RUNE_MOTION_DURATION") {
            if duration.is_finite() && duration >= 0.0 {
                self.motion.default_duration_s = duration;
            }
        }
        if let Ok(easing) = std::env::var("RUNE_MOTION_EASING") {
            if !easing.trim().is_empty() {
                self.motion.default_easing = easing.trim().to_string();
            }
        }
        if let Some(step) = parse_env::<f64>("RUNE_MOTION_STAGGER") {
            if step.is_finite() {
                self.motion.stagger_step_s = step;
            }
        }
        if let Some(interval) = parse_env::<f64>("RUNE_MOTION_FRAME_MS") {
            if interval.is_finite() && interval > 0.0 {
                self.motion.frame_interval_ms = interval;
            }
        }

        if let Some(frames) = parse_env::<u32>("RUNE_DEMO_FRAMES") {
            self.demo.frames = Some(frames);
        }
        if let Ok(filter) = std::env::var("RUNE_LOG") {
            self.demo.log_filter = filter;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// This is the recommended way to load configuration:
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
