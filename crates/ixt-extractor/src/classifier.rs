//! Intent classifier adapters
//!
//! Two inference-only implementations of [`TextClassifier`]:
//! - [`KeywordClassifier`]: keyword occurrence scoring with a fallback label
//! - [`NaiveBayesClassifier`]: multinomial naive Bayes loaded from an exported model

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use ixt_core::{IxtError, Result, TextClassifier};

use crate::rules::{ADDRESS_CHANGE, BENEFICIARY_CHANGE};

pub const CONTACT_UPDATE: &str = "contact_update";
pub const GENERAL_INQUIRY: &str = "general_inquiry";

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| IxtError::Model(format!("failed to read {what} {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| IxtError::Model(format!("failed to parse {what} {}: {e}", path.display())))
}

// ============================================================================
// Keyword Classifier
// ============================================================================

/// Keywords for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Serialized keyword table (JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordTable {
    /// Label returned when no keyword matches
    pub fallback: String,
    /// Categories in priority order (ties go to the earlier one)
    pub categories: Vec<KeywordCategory>,
}

impl KeywordTable {
    /// Default table for customer requests
    pub fn builtin() -> Self {
        let category = |label: &str, keywords: &[&str]| KeywordCategory {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };

        Self {
            fallback: GENERAL_INQUIRY.to_string(),
            categories: vec![
                category(
                    BENEFICIARY_CHANGE,
                    &["beneficiary", "beneficiaries", "nominee", "payout to", "policy number"],
                ),
                category(
                    ADDRESS_CHANGE,
                    &["address", "moved", "moving", "relocat", "street", "new home"],
                ),
                category(
                    CONTACT_UPDATE,
                    &["phone", "mobile", "email", "e-mail", "contact details", "number is"],
                ),
            ],
        }
    }
}

/// Keyword-scoring classifier
pub struct KeywordClassifier {
    table: KeywordTable,
}

impl KeywordClassifier {
    pub fn new(mut table: KeywordTable) -> Self {
        for category in &mut table.categories {
            for keyword in &mut category.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
        Self { table }
    }

    pub fn builtin() -> Self {
        Self::new(KeywordTable::builtin())
    }

    /// Load a JSON keyword table
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(read_json(path.as_ref(), "keyword table")?))
    }

    /// Score of each category, in table order
    pub fn scores(&self, text: &str) -> Vec<(&str, usize)> {
        let text_lower = text.to_lowercase();
        self.table
            .categories
            .iter()
            .map(|category| {
                let score: usize = category
                    .keywords
                    .iter()
                    .filter(|kw| !kw.is_empty())
                    .map(|kw| text_lower.matches(kw.as_str()).count())
                    .sum();
                (category.label.as_str(), score)
            })
            .collect()
    }
}

impl TextClassifier for KeywordClassifier {
    fn predict(&self, text: &str) -> Result<String> {
        let mut best: Option<(&str, usize)> = None;
        for (label, score) in self.scores(text) {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((label, score));
            }
        }

        Ok(best
            .map(|(label, _)| label)
            .unwrap_or(self.table.fallback.as_str())
            .to_string())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

// ============================================================================
// Naive Bayes Classifier
// ============================================================================

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid token regex"));

/// Lowercase word tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Parameters of one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesClass {
    pub label: String,
    pub log_prior: f64,
    /// Token -> log P(token | class)
    pub log_likelihoods: HashMap<String, f64>,
    /// Log-likelihood for tokens absent from `log_likelihoods`
    pub unseen_log_likelihood: f64,
}

/// Exported multinomial naive-Bayes model (JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    pub classes: Vec<NaiveBayesClass>,
}

/// Multinomial naive-Bayes classifier
#[derive(Debug)]
pub struct NaiveBayesClassifier {
    model: NaiveBayesModel,
}

impl NaiveBayesClassifier {
    pub fn new(model: NaiveBayesModel) -> Result<Self> {
        if model.classes.is_empty() {
            return Err(IxtError::Model(
                "naive Bayes model has no classes".to_string(),
            ));
        }
        let non_finite = model.classes.iter().find(|c| {
            !c.log_prior.is_finite()
                || !c.unseen_log_likelihood.is_finite()
                || c.log_likelihoods.values().any(|v| !v.is_finite())
        });
        if let Some(class) = non_finite {
            return Err(IxtError::Model(format!(
                "class '{}' has non-finite parameters",
                class.label
            )));
        }
        Ok(Self { model })
    }

    /// Load an exported model
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(read_json(path.as_ref(), "naive Bayes model")?)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.model.classes.iter().map(|c| c.label.as_str())
    }

    /// Joint log-probability of the text under each class
    pub fn log_scores(&self, text: &str) -> Vec<(&str, f64)> {
        let tokens: Vec<String> = tokenize(text).collect();
        self.model
            .classes
            .iter()
            .map(|class| {
                let likelihood: f64 = tokens
                    .iter()
                    .map(|t| {
                        class
                            .log_likelihoods
                            .get(t)
                            .copied()
                            .unwrap_or(class.unseen_log_likelihood)
                    })
                    .sum();
                (class.label.as_str(), class.log_prior + likelihood)
            })
            .collect()
    }
}

impl TextClassifier for NaiveBayesClassifier {
    fn predict(&self, text: &str) -> Result<String> {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.log_scores(text) {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((label, score)),
            }
        }

        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| IxtError::Classifier("no classes to score".to_string()))
    }

    fn name(&self) -> &str {
        "naive_bayes"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn class(label: &str, log_prior: f64, tokens: &[(&str, f64)]) -> NaiveBayesClass {
        NaiveBayesClass {
            label: label.to_string(),
            log_prior,
            log_likelihoods: tokens.iter().map(|(t, p)| (t.to_string(), *p)).collect(),
            unseen_log_likelihood: -8.0,
        }
    }

    fn model() -> NaiveBayesModel {
        NaiveBayesModel {
            classes: vec![
                class(
                    "beneficiary_change",
                    -1.0,
                    &[("beneficiary", -1.5), ("wife", -2.0), ("policy", -2.0)],
                ),
                class(
                    "address_change",
                    -1.2,
                    &[("address", -1.5), ("street", -2.0), ("moved", -2.5)],
                ),
            ],
        }
    }

    #[test]
    fn test_keyword_classifier_builtin() {
        let classifier = KeywordClassifier::builtin();

        assert_eq!(
            classifier
                .predict("Please change the beneficiary on policy number 123456")
                .unwrap(),
            "beneficiary_change"
        );
        assert_eq!(
            classifier
                .predict("Update my ADDRESS to 123 Main Street")
                .unwrap(),
            "address_change"
        );
        assert_eq!(
            classifier.predict("My new mobile number is 555 0100 200").unwrap(),
            "contact_update"
        );
        assert_eq!(
            classifier.predict("When is my next premium due?").unwrap(),
            "general_inquiry"
        );
    }

    #[test]
    fn test_keyword_tie_goes_to_earlier_category() {
        let classifier = KeywordClassifier::builtin();
        let scores = classifier.scores("beneficiary address");
        assert_eq!(scores[0], ("beneficiary_change", 1));
        assert_eq!(scores[1], ("address_change", 1));
        assert_eq!(
            classifier.predict("beneficiary address").unwrap(),
            "beneficiary_change"
        );
    }

    #[test]
    fn test_keyword_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"fallback": "other", "categories": [{{"label": "claim_status", "keywords": ["Claim"]}}]}}"#
        )
        .unwrap();

        let classifier = KeywordClassifier::from_file(file.path()).unwrap();
        assert_eq!(classifier.predict("where is my claim?").unwrap(), "claim_status");
        assert_eq!(classifier.predict("hello").unwrap(), "other");
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("Change my Beneficiary, please!").collect();
        assert_eq!(tokens, vec!["change", "my", "beneficiary", "please"]);
    }

    #[test]
    fn test_naive_bayes_predict() {
        let classifier = NaiveBayesClassifier::new(model()).unwrap();

        assert_eq!(
            classifier.predict("beneficiary should be my wife").unwrap(),
            "beneficiary_change"
        );
        assert_eq!(
            classifier.predict("I moved, new address on Elm street").unwrap(),
            "address_change"
        );
        // Empty text falls back to the highest prior
        assert_eq!(classifier.predict("").unwrap(), "beneficiary_change");
    }

    #[test]
    fn test_naive_bayes_rejects_empty_model() {
        let result = NaiveBayesClassifier::new(NaiveBayesModel { classes: vec![] });
        assert!(matches!(result, Err(IxtError::Model(_))));
    }

    #[test]
    fn test_naive_bayes_rejects_non_finite() {
        let mut model = model();
        model.classes[1].log_prior = f64::NEG_INFINITY;
        assert!(matches!(
            NaiveBayesClassifier::new(model),
            Err(IxtError::Model(_))
        ));
    }

    #[test]
    fn test_naive_bayes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&model()).unwrap().as_bytes())
            .unwrap();

        let classifier = NaiveBayesClassifier::from_file(file.path()).unwrap();
        let labels: Vec<&str> = classifier.labels().collect();
        assert_eq!(labels, vec!["beneficiary_change", "address_change"]);
    }

    #[test]
    fn test_missing_model_file() {
        let result = NaiveBayesClassifier::from_file("/nonexistent/model.json");
        assert!(matches!(result, Err(IxtError::Model(_))));
    }
}
