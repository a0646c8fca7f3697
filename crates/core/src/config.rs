//! Router configuration loaded from TOML
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration:
//!
//! ```toml
//! [layout]
//! delimiter = "|"
//!
//! [instructions]
//! meters_per_cell = 10
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 200
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::controller::RetryPolicy;
use crate::error::ConfigError;
use crate::grid::Cell;
use crate::instructions::{InstructionGenerator, DEFAULT_METERS_PER_CELL, MAX_METERS_PER_CELL};

/// Top-level configuration for one recompute controller
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RouterConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub instructions: InstructionConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// How layout strings are split into rows
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Row delimiter (default: `|`)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Instruction rendering
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct InstructionConfig {
    /// Distance represented by one cell in meters (default: 10)
    #[serde(default = "default_meters_per_cell")]
    pub meters_per_cell: usize,
}

/// Persistence retry schedule
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total write attempts including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds; the wait after failed attempt `i` is `base * 2^i`
    /// (default: 200)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_delimiter() -> char {
    '|'
}

fn default_meters_per_cell() -> usize {
    DEFAULT_METERS_PER_CELL
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    200
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl Default for InstructionConfig {
    fn default() -> Self {
        Self {
            meters_per_cell: default_meters_per_cell(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

impl InstructionConfig {
    pub fn generator(&self) -> InstructionGenerator {
        InstructionGenerator::new(self.meters_per_cell)
    }
}

impl RouterConfig {
    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or fails validation
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error if the document cannot be parsed or fails validation
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.layout.delimiter;
        if Cell::RESERVED.contains(&delimiter) || delimiter == Cell::FLOOR {
            return Err(ConfigError::Invalid(format!(
                "delimiter '{delimiter}' collides with a cell code"
            )));
        }
        let meters = self.instructions.meters_per_cell;
        if !(1..=MAX_METERS_PER_CELL).contains(&meters) {
            return Err(ConfigError::Invalid(format!(
                "meters_per_cell must be between 1 and {MAX_METERS_PER_CELL}, got {meters}"
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RouterConfig::from_toml("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.layout.delimiter, '|');
        assert_eq!(config.instructions.meters_per_cell, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 200);
    }

    #[test]
    fn test_partial_document() {
        let config = RouterConfig::from_toml(
            r#"
            [layout]
            delimiter = ";"

            [retry]
            base_delay_ms = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.delimiter, ';');
        assert_eq!(config.retry.base_delay_ms, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.policy().base_delay(), Duration::from_millis(5));
    }

    #[test]
    fn test_rejects_reserved_delimiter() {
        let err = RouterConfig::from_toml("[layout]\ndelimiter = \"W\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(RouterConfig::from_toml("[instructions]\nmeters_per_cell = 0").is_err());
        assert!(RouterConfig::from_toml("[retry]\nmax_attempts = 0").is_err());
    }

    #[test]
    fn test_rejects_oversized_scale() {
        let err = RouterConfig::from_toml("[instructions]\nmeters_per_cell = 9223372036854775807")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let at_limit = format!("[instructions]\nmeters_per_cell = {MAX_METERS_PER_CELL}");
        assert!(RouterConfig::from_toml(&at_limit).is_ok());
    }

    #[test]
    fn test_parse_error() {
        let err = RouterConfig::from_toml("[retry]\nmax_attempts = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let err = RouterConfig::load(Path::new("/nonexistent/evac-route.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)), "{err}");
    }
}
