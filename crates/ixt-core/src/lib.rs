//! IXT Core - Domain types, adapter traits, and shared configuration
//!
//! This crate defines the abstractions shared by the extraction engine,
//! the HTTP server and the CLI:
//! - Common error types
//! - Recognizer output and the final entity mapping
//! - Traits for the classifier and entity recognizer adapters
//! - Configuration management
//!
//! Author: IXT Contributors

pub mod config;

pub use config::{
    AppConfig, ClassifierKind, ConfigError, ExtractionConfig, LoggingConfig, ModelConfig,
    ServerConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for IXT operations
#[derive(Error, Debug)]
pub enum IxtError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Invalid rule for field '{field}': {message}")]
    InvalidRule { field: String, message: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IxtError>;

impl From<ConfigError> for IxtError {
    fn from(err: ConfigError) -> Self {
        IxtError::Config(err.to_string())
    }
}

// ============================================================================
// Recognizer Output
// ============================================================================

/// A labeled span emitted by an entity recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Entity label (e.g. "DATE", "PERSON")
    pub label: String,
    /// Surface text of the span
    pub text: String,
    /// Byte offset of the span start
    pub start: usize,
    /// Byte offset one past the span end
    pub end: usize,
}

impl RecognizedEntity {
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

// ============================================================================
// Entity Mapping
// ============================================================================

/// Value stored under a key of the entity mapping
///
/// Recognizer labels collect every span in emission order, rule fields hold
/// a single string. Serialized untagged so the JSON is either an array or a
/// plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Spans(Vec<String>),
    Field(String),
}

impl EntityValue {
    /// Recognizer spans, if this is a recognizer value
    pub fn as_spans(&self) -> Option<&[String]> {
        match self {
            Self::Spans(spans) => Some(spans),
            Self::Field(_) => None,
        }
    }

    /// Rule value, if this is a rule field
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(value) => Some(value),
            Self::Spans(_) => None,
        }
    }
}

/// Field name / recognizer label to extracted value
///
/// Keys are kept sorted so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMapping(BTreeMap<String, EntityValue>);

impl EntityMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recognizer span under `label`, creating the sequence on first use
    pub fn push_span(&mut self, label: impl Into<String>, span: impl Into<String>) {
        let span = span.into();
        let slot = self
            .0
            .entry(label.into())
            .or_insert_with(|| EntityValue::Spans(Vec::new()));

        match slot {
            EntityValue::Spans(spans) => spans.push(span),
            EntityValue::Field(_) => *slot = EntityValue::Spans(vec![span]),
        }
    }

    /// Set a rule field, replacing whatever is stored under that key
    pub fn set_field(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), EntityValue::Field(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&EntityValue> {
        self.0.get(key)
    }

    /// Shorthand for a rule field value
    pub fn field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EntityValue::as_field)
    }

    /// Shorthand for recognizer spans
    pub fn spans(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(EntityValue::as_spans)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a hybrid extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Predicted category, echoed unchanged
    pub category: String,
    /// Recognizer spans and rule fields
    pub entities: EntityMapping,
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for text classifiers
///
/// Implementations are loaded once and shared read-only across requests.
pub trait TextClassifier: Send + Sync {
    /// Predict a single category label for the text
    fn predict(&self, text: &str) -> Result<String>;

    /// Get classifier name for logging
    fn name(&self) -> &str;
}

/// Trait for statistical entity recognizers
pub trait EntityRecognizer: Send + Sync {
    /// Recognize labeled spans, in emission order
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;

    /// Get recognizer name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
