//! Classification + extraction pipeline
//!
//! Builds the adapters from configuration once at start-up and runs
//! classify -> extract for each request.

use std::sync::Arc;

use ixt_core::{
    ClassifierKind, EntityRecognizer, Extraction, ExtractionConfig, IxtError, ModelConfig,
    Result, TextClassifier,
};

use crate::classifier::{KeywordClassifier, NaiveBayesClassifier};
use crate::engine::HybridExtractor;
use crate::ner::GazetteerRecognizer;
use crate::rules::RuleSet;

/// Load the configured classifier
pub fn build_classifier(config: &ModelConfig) -> Result<Arc<dyn TextClassifier>> {
    let classifier: Arc<dyn TextClassifier> = match (config.classifier, &config.classifier_path) {
        (ClassifierKind::Keyword, None) => Arc::new(KeywordClassifier::builtin()),
        (ClassifierKind::Keyword, Some(path)) => Arc::new(KeywordClassifier::from_file(path)?),
        (ClassifierKind::NaiveBayes, Some(path)) => {
            Arc::new(NaiveBayesClassifier::from_file(path)?)
        }
        (ClassifierKind::NaiveBayes, None) => {
            return Err(IxtError::Config(
                "the naive_bayes classifier requires models.classifier_path".to_string(),
            ))
        }
    };

    tracing::info!(
        classifier = classifier.name(),
        path = ?config.classifier_path,
        "classifier loaded"
    );
    Ok(classifier)
}

/// Load the configured entity recognizer
pub fn build_recognizer(config: &ModelConfig) -> Result<Arc<dyn EntityRecognizer>> {
    let recognizer = match &config.recognizer_path {
        Some(path) => GazetteerRecognizer::from_file(path)?,
        None => GazetteerRecognizer::builtin()?,
    };

    tracing::info!(
        recognizer = recognizer.name(),
        matchers = recognizer.len(),
        path = ?config.recognizer_path,
        "entity recognizer loaded"
    );
    Ok(Arc::new(recognizer))
}

/// Load the configured rule set
pub fn build_rules(config: &ExtractionConfig) -> Result<RuleSet> {
    let rules = match &config.rules_path {
        Some(path) => RuleSet::from_file(path)?,
        None => RuleSet::builtin()?,
    };

    tracing::info!(
        rules = rules.len(),
        categories = ?rules.categories(),
        "extraction rules loaded"
    );
    Ok(rules)
}

/// Classifier and hybrid extractor, shared read-only across requests
pub struct Pipeline {
    classifier: Arc<dyn TextClassifier>,
    extractor: HybridExtractor,
}

impl Pipeline {
    pub fn new(classifier: Arc<dyn TextClassifier>, extractor: HybridExtractor) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    /// Build every adapter from configuration
    pub fn from_config(models: &ModelConfig, extraction: &ExtractionConfig) -> Result<Self> {
        let classifier = build_classifier(models)?;
        let recognizer = build_recognizer(models)?;
        let rules = build_rules(extraction)?;
        Ok(Self::new(classifier, HybridExtractor::new(recognizer, rules)))
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn extractor(&self) -> &HybridExtractor {
        &self.extractor
    }

    /// Predict the category only
    pub fn classify(&self, text: &str) -> Result<String> {
        self.classifier.predict(text)
    }

    /// Extract under a known category, skipping the classifier
    pub fn extract_as(&self, text: &str, category: &str) -> Result<Extraction> {
        self.extractor.extract(text, category)
    }

    /// Classify, then extract under the predicted category
    pub fn run(&self, text: &str) -> Result<Extraction> {
        let category = self.classify(text)?;
        tracing::debug!(category = %category, "text classified");
        self.extract_as(text, &category)
    }
}

// ============================================================================
// Tests
// ============================================================================
