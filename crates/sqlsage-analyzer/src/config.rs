//! Advisor Configuration
//!
//! Tunables for formatting, plan interpretation thresholds, and which
//! insight rules run. Every field has a default, so a TOML document only
//! needs to name what it overrides.
//!
//! # Example
//!
//! ```
//! use sqlsage_analyzer::config::{AdvisorConfig, RuleSet};
//!
//! let config = AdvisorConfig::from_toml_str(r#"
//! rule_set = "builtin"
//!
//! [plan]
//! large_table_threshold = 500
//! "#).unwrap();
//!
//! assert_eq!(config.rule_set, RuleSet::Builtin);
//! assert_eq!(config.plan.large_table_threshold, 500);
//! assert_eq!(config.formatter.indent_size, 2);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which insight rules the plan interpreter runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Fixed sample insights that ignore the plan contents
    #[default]
    Placeholder,
    /// Rules that inspect the normalized plan tree
    Builtin,
}

/// Options for the pretty-printed query rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    /// Number of spaces for each indentation level
    pub indent_size: usize,
    /// Whether to use uppercase for SQL keywords
    pub uppercase_keywords: bool,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            indent_size: 2,
            uppercase_keywords: true,
        }
    }
}

/// Row-count thresholds used by the built-in plan rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanThresholds {
    /// Full scans estimated at or above this many rows are major concerns
    pub large_table_threshold: u64,
    /// Row estimates at or above this are reported as high volume
    pub high_row_threshold: u64,
}

impl Default for PlanThresholds {
    fn default() -> Self {
        Self {
            large_table_threshold: 1_000,
            high_row_threshold: 10_000,
        }
    }
}

/// Top-level configuration for the query advisor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub formatter: FormatterSettings,
    pub plan: PlanThresholds,
    pub rule_set: RuleSet,
}

impl AdvisorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from TOML text and validates it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Sets the indentation size used when formatting
    pub fn with_indent_size(mut self, size: usize) -> Self {
        self.formatter.indent_size = size;
        self
    }

    /// Sets whether to uppercase keywords when formatting
    pub fn with_uppercase_keywords(mut self, uppercase: bool) -> Self {
        self.formatter.uppercase_keywords = uppercase;
        self
    }

    /// Sets the plan thresholds
    pub fn with_plan_thresholds(mut self, thresholds: PlanThresholds) -> Self {
        self.plan = thresholds;
        self
    }

    /// Sets which insight rules run
    pub fn with_rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_set = rule_set;
        self
    }

    /// Checks invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formatter.indent_size == 0 {
            return Err(ConfigError::Invalid(
                "formatter.indent_size must be at least 1".into(),
            ));
        }
        if self.plan.large_table_threshold > self.plan.high_row_threshold {
            return Err(ConfigError::Invalid(format!(
                "plan.large_table_threshold ({}) exceeds plan.high_row_threshold ({})",
                self.plan.large_table_threshold, self.plan.high_row_threshold
            )));
        }
        Ok(())
    }
}
