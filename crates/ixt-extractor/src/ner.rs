//! Named Entity Recognition (NER) adapter
//!
//! A gazetteer recognizer combining labeled regex patterns with dictionary
//! terms. It stands in for a trained statistical model behind the
//! [`EntityRecognizer`] trait; any other model can be plugged in the same way.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use ixt_core::{EntityRecognizer, IxtError, RecognizedEntity, Result};

// ============================================================================
// Gazetteer Definition
// ============================================================================

/// Labeled regex pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    pub label: String,
    pub pattern: String,
}

/// Dictionary entry for entity matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub label: String,
    pub term: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Serialized gazetteer (JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub terms: Vec<DictionaryEntry>,
}

impl Gazetteer {
    /// Default labels for customer requests
    pub fn builtin() -> Self {
        let mut gazetteer = Self::default();

        // Dates
        gazetteer.add_pattern(
            "DATE",
            r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)(?:\s+\d{1,2}(?:st|nd|rd|th)?,?)?\s+\d{4}\b",
        );
        gazetteer.add_pattern("DATE", r"\b\d{4}-\d{1,2}-\d{1,2}\b");
        gazetteer.add_pattern("DATE", r"\b\d{1,2}/\d{1,2}/\d{4}\b");
        gazetteer.add_pattern("DATE", r"(?i)\bnext\s+(?:week|month|year)\b");
        gazetteer.add_term("DATE", "today", &["tomorrow", "yesterday"]);

        // Money
        gazetteer.add_pattern("MONEY", r"[$£€]\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?");
        gazetteer.add_pattern("MONEY", r"(?i)\b\d+(?:\.\d{2})?\s*(?:dollars|usd|euros?|pounds)\b");

        // Family relationships
        gazetteer.add_term("RELATIONSHIP", "wife", &["husband", "spouse", "partner"]);
        gazetteer.add_term("RELATIONSHIP", "son", &["daughter", "child", "children"]);
        gazetteer.add_term("RELATIONSHIP", "mother", &["father", "parent"]);
        gazetteer.add_term("RELATIONSHIP", "brother", &["sister", "sibling"]);

        gazetteer
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IxtError::Model(format!("failed to read gazetteer {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            IxtError::Model(format!("failed to parse gazetteer {}: {e}", path.display()))
        })
    }

    fn add_pattern(&mut self, label: &str, pattern: &str) {
        self.patterns.push(PatternEntry {
            label: label.to_string(),
            pattern: pattern.to_string(),
        });
    }

    fn add_term(&mut self, label: &str, term: &str, aliases: &[&str]) {
        self.terms.push(DictionaryEntry {
            label: label.to_string(),
            term: term.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        });
    }
}

// ============================================================================
// Gazetteer Recognizer
// ============================================================================

/// Pattern and dictionary based recognizer
pub struct GazetteerRecognizer {
    /// Compiled matchers (regex -> label); dictionary entries become
    /// case-insensitive whole-word alternations
    matchers: Vec<(Regex, String)>,
}

impl GazetteerRecognizer {
    /// Compile a gazetteer
    pub fn new(gazetteer: Gazetteer) -> Result<Self> {
        let mut matchers = Vec::with_capacity(gazetteer.patterns.len() + gazetteer.terms.len());

        for entry in gazetteer.patterns {
            let regex = Regex::new(&entry.pattern).map_err(|e| {
                IxtError::Model(format!("invalid {} pattern '{}': {e}", entry.label, entry.pattern))
            })?;
            matchers.push((regex, entry.label));
        }

        for entry in gazetteer.terms {
            let alternatives: Vec<String> = std::iter::once(&entry.term)
                .chain(entry.aliases.iter())
                .filter(|t| !t.trim().is_empty())
                .map(|t| regex::escape(t.trim()))
                .collect();
            if alternatives.is_empty() {
                continue;
            }

            let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| IxtError::Model(format!("invalid term '{}': {e}", entry.term)))?;
            matchers.push((regex, entry.label));
        }

        Ok(Self { matchers })
    }

    /// Recognizer with the built-in gazetteer
    pub fn builtin() -> Result<Self> {
        Self::new(Gazetteer::builtin())
    }

    /// Recognizer from a JSON gazetteer file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Gazetteer::from_file(path)?)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Remove overlapping spans: earliest start wins, then the longest span
    fn resolve_overlaps(mut spans: Vec<RecognizedEntity>) -> Vec<RecognizedEntity> {
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut result: Vec<RecognizedEntity> = Vec::with_capacity(spans.len());
        let mut covered_until = 0;

        for span in spans {
            if span.start < covered_until {
                continue;
            }
            covered_until = span.end;
            result.push(span);
        }

        result
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let spans = self
            .matchers
            .iter()
            .flat_map(|(regex, label)| {
                regex.find_iter(text).map(move |m| {
                    RecognizedEntity::new(label.clone(), m.as_str(), m.start(), m.end())
                })
            })
            .filter(|span| span.start < span.end)
            .collect();

        Ok(Self::resolve_overlaps(spans))
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

// ============================================================================
// Tests
// ============================================================================
