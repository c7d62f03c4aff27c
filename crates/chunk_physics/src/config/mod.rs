//! Configuration system
//!
//! Physics tuning is constructor-time only. [`PhysicsConfig`] can be built in
//! code or loaded from a `.toml` / `.ron` file through the [`Config`] trait.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its valid domain
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tuning parameters for the physics step and the chunk index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward gravitational acceleration (units per second squared)
    pub gravity_constant: f32,

    /// Accelerations at or below this magnitude are dropped during integration
    pub sleep_threshold: f32,

    /// Edge length of a chunk cell along each axis
    pub chunk_size: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_constant: 9.81,
            sleep_threshold: 0.01,
            chunk_size: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Builder pattern: Set gravity constant
    pub fn with_gravity_constant(mut self, gravity_constant: f32) -> Self {
        self.gravity_constant = gravity_constant;
        self
    }

    /// Builder pattern: Set sleep threshold
    pub fn with_sleep_threshold(mut self, sleep_threshold: f32) -> Self {
        self.sleep_threshold = sleep_threshold;
        self
    }

    /// Builder pattern: Set the same chunk size on every axis
    pub fn with_uniform_chunk_size(mut self, size: f32) -> Self {
        self.chunk_size = Vec3::new(size, size, size);
        self
    }

    /// Builder pattern: Set per-axis chunk size
    pub fn with_chunk_size(mut self, chunk_size: Vec3) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check every value against its domain
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity_constant.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity_constant must be finite, got {}",
                self.gravity_constant
            )));
        }
        if !self.sleep_threshold.is_finite() || self.sleep_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sleep_threshold must be finite and >= 0, got {}",
                self.sleep_threshold
            )));
        }
        if self.chunk_size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be finite and > 0 on every axis, got {:?}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}
