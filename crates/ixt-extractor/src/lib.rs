//! IXT Extractor - Hybrid extraction pipeline
//!
//! Combines a statistical entity recognizer with deterministic pattern
//! rules selected by the predicted intent category.
//!
//! Author: IXT Contributors

pub mod classifier;
pub mod engine;
pub mod ner;
pub mod pipeline;
pub mod rules;

pub use classifier::{KeywordClassifier, NaiveBayesClassifier};
pub use engine::HybridExtractor;
pub use ner::GazetteerRecognizer;
pub use pipeline::Pipeline;
pub use rules::{Capture, ExtractionRule, RuleScope, RuleSet, RuleSpec};
