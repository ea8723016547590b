//! IXT Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for development.
//!
//! Author: IXT Contributors

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming a TOML config file
pub const CONFIG_PATH_ENV: &str = "IXT_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Classifier and recognizer artifacts
    pub models: ModelConfig,

    /// Pattern rule configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the config file named by `IXT_CONFIG` (if any), then apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path)?.with_env_override(),
            _ => Self::from_env(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
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

    /// Apply environment variables on top of this config (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = parse_env("API_PORT", port)?;
        }
        if let Ok(size) = std::env::var("MAX_BODY_SIZE") {
            self.server.max_body_size = parse_env("MAX_BODY_SIZE", size)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Models
        if let Ok(kind) = std::env::var("CLASSIFIER_KIND") {
            self.models.classifier = kind.parse()?;
        }
        if let Ok(path) = std::env::var("CLASSIFIER_MODEL_PATH") {
            self.models.classifier_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("NER_MODEL_PATH") {
            self.models.recognizer_path = Some(PathBuf::from(path));
        }
        if let Ok(ms) = std::env::var("INFERENCE_TIMEOUT_MS") {
            self.models.inference_timeout_ms = parse_env("INFERENCE_TIMEOUT_MS", ms)?;
        }

        // Extraction rules
        if let Ok(path) = std::env::var("EXTRACTION_RULES_PATH") {
            self.extraction.rules_path = Some(PathBuf::from(path));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.classifier == ClassifierKind::NaiveBayes
            && self.models.classifier_path.is_none()
        {
            return Err(ConfigError::MissingRequired(
                "models.classifier_path (required for the naive_bayes classifier)".to_string(),
            ));
        }
        if self.models.inference_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "models.inference_timeout_ms".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS (empty means any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 1024 * 1024, // 1MB
            cors_enabled: true,
            cors_origins: vec![],
        }
    }
}

/// Classifier and recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Classifier implementation to load
    pub classifier: ClassifierKind,

    /// Classifier artifact (keyword table or naive-Bayes export)
    pub classifier_path: Option<PathBuf>,

    /// Gazetteer file for the entity recognizer
    pub recognizer_path: Option<PathBuf>,

    /// Upper bound for one classify + extract run, in milliseconds
    pub inference_timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Keyword,
            classifier_path: None,
            recognizer_path: None,
            inference_timeout_ms: 5_000,
        }
    }
}

/// Supported classifier implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Keyword,
    NaiveBayes,
}

impl std::str::FromStr for ClassifierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "keyword" => Ok(Self::Keyword),
            "naive_bayes" | "nb" => Ok(Self::NaiveBayes),
            _ => Err(ConfigError::InvalidValue {
                key: "CLASSIFIER_KIND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::NaiveBayes => write!(f, "naive_bayes"),
        }
    }
}

/// Pattern rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// TOML rules file replacing the built-in rule set
    pub rules_path: Option<PathBuf>,
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

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
