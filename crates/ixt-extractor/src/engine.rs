//! Hybrid extraction engine
//!
//! Runs the statistical recognizer first, then the pattern rules for the
//! predicted category followed by the global rules.
//!
//! Author: IXT Contributors

use std::collections::HashSet;
use std::sync::Arc;

use ixt_core::{EntityMapping, EntityRecognizer, Extraction, Result};

use crate::rules::RuleSet;

/// Recognizer + pattern rule extractor
pub struct HybridExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    rules: RuleSet,
}

impl HybridExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, rules: RuleSet) -> Self {
        Self { recognizer, rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Extract entities for `text` under `category`
    ///
    /// Unknown categories only receive the global rules. Recognizer errors are
    /// returned as-is.
    pub fn extract(&self, text: &str, category: &str) -> Result<Extraction> {
        let mut entities = EntityMapping::new();

        // Statistical pass
        for entity in self.recognizer.recognize(text)? {
            entities.push_span(entity.label, entity.text);
        }

        // Pattern pass: first matching rule per field wins
        let mut filled: HashSet<&str> = HashSet::new();
        for rule in self.rules.rules_for(category) {
            if filled.contains(rule.field()) {
                continue;
            }
            if let Some(value) = rule.apply(text) {
                // Recognizer output is never overwritten
                if entities.contains_key(rule.field()) {
                    tracing::warn!(
                        field = rule.field(),
                        value = %value,
                        "rule field collides with a recognizer label, keeping recognizer spans"
                    );
                    filled.insert(rule.field());
                    continue;
                }
                tracing::debug!(field = rule.field(), scope = %rule.scope(), "rule matched");
                entities.set_field(rule.field(), value);
                filled.insert(rule.field());
            }
        }

        Ok(Extraction {
            category: category.to_string(),
            entities,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
