//! RCX Configuration Management
//!
//! Handles configuration from environment variables, config files,
//! and command-line arguments with defaults suitable for corpus runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::lexicon::Lexicon;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Closed word lists
    pub lexicon: Lexicon,

    /// Opt-in filter rules
    pub filters: FilterConfig,

    /// Batch processing
    pub batch: BatchConfig,

    /// Result persistence
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        EnvOverrides::from_env()?.apply(&mut config);
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        EnvOverrides::from_env()?.apply(&mut self);
        Ok(self)
    }
}

/// Settings taken from the environment; `None` where the variable is unset
#[derive(Debug)]
struct EnvOverrides {
    concurrency: Option<usize>,
    alignment: Option<AlignmentPolicy>,
    format: Option<OutputFormat>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let concurrency = lookup("RCX_CONCURRENCY")
            .map(|value| {
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RCX_CONCURRENCY".to_string(),
                    value,
                })
            })
            .transpose()?;

        Ok(Self {
            concurrency,
            alignment: lookup("RCX_ALIGNMENT").map(|v| v.parse()).transpose()?,
            format: lookup("RCX_OUTPUT_FORMAT").map(|v| v.parse()).transpose()?,
            log_level: lookup("LOG_LEVEL"),
            log_json: lookup("RCX_LOG_JSON")
                .map(|v| parse_bool("RCX_LOG_JSON", &v))
                .transpose()?,
        })
    }

    fn apply(self, config: &mut AppConfig) {
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(alignment) = self.alignment {
            config.batch.alignment = alignment;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(json) = self.log_json {
            config.logging.json_format = json;
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Opt-in filter rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Reject relativizer-less clauses whose verb is followed by `to`
    pub temporary_ambiguity: bool,

    /// Score relativizer-less clauses and reject low-confidence ones
    pub zero_confidence: bool,

    /// Clauses scoring below this are rejected
    pub zero_confidence_threshold: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            temporary_ambiguity: false,
            zero_confidence: false,
            zero_confidence_threshold: -1,
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Sentences in flight; 0 uses the available parallelism
    pub concurrency: usize,

    /// What to do when the two parses disagree
    pub alignment: AlignmentPolicy,
}

impl BatchConfig {
    /// Concurrency with the 0 default resolved
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency > 0 {
            self.concurrency
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Policy for sentences whose constituency tree cannot be used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Skip the sentence
    #[default]
    Strict,
    /// Drop the tree and resolve boundaries from dependency subtrees
    DependencyOnly,
}

impl std::str::FromStr for AlignmentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "dependency_only" | "dependency-only" => Ok(Self::DependencyOnly),
            _ => Err(ConfigError::InvalidValue {
                key: "RCX_ALIGNMENT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Append to an existing output file instead of replacing it
    pub append: bool,
}

/// Supported export formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json" => Ok(Self::Jsonl),
            _ => Err(ConfigError::InvalidValue {
                key: "RCX_OUTPUT_FORMAT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
