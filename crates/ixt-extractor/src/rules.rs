//! Pattern rules
//!
//! Every deterministic field is a [`RuleSpec`] record compiled into an
//! [`ExtractionRule`]. A [`RuleSet`] maps category labels to their ordered
//! rules and keeps a list of global rules evaluated for every category.
//!
//! Author: IXT Contributors

use std::collections::HashMap;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use ixt_core::{IxtError, Result};

// ============================================================================
// Rule Records
// ============================================================================

/// Which part of a match becomes the field value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capture {
    /// The whole match
    #[default]
    Match,
    /// The whole match with surrounding whitespace removed
    Trimmed,
    /// A numbered capture group
    Group(usize),
}

/// Serializable rule definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Output field name
    pub field: String,
    /// Regular expression
    pub pattern: String,
    /// Category the rule is restricted to; `None` applies it to every category
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub capture: Capture,
}

impl RuleSpec {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            category: None,
            case_insensitive: false,
            capture: Capture::Match,
        }
    }

    pub fn for_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Compile into an executable rule
    pub fn compile(&self) -> Result<ExtractionRule> {
        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|e| IxtError::InvalidRule {
                field: self.field.clone(),
                message: e.to_string(),
            })?;

        if let Capture::Group(index) = self.capture {
            if index >= regex.captures_len() {
                return Err(IxtError::InvalidRule {
                    field: self.field.clone(),
                    message: format!(
                        "capture group {index} does not exist (pattern has {})",
                        regex.captures_len() - 1
                    ),
                });
            }
        }

        let scope = match &self.category {
            Some(category) => RuleScope::Category(category.clone()),
            None => RuleScope::Global,
        };

        Ok(ExtractionRule {
            field: self.field.clone(),
            regex,
            scope,
            capture: self.capture,
        })
    }
}

/// Where a rule applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Category(String),
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.pad("*"),
            Self::Category(category) => f.pad(category),
        }
    }
}

/// A compiled pattern rule
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    field: String,
    regex: Regex,
    scope: RuleScope,
    capture: Capture,
}

impl ExtractionRule {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn scope(&self) -> &RuleScope {
        &self.scope
    }

    /// Value of the leftmost match, or `None` when the text does not match
    pub fn apply(&self, text: &str) -> Option<String> {
        match self.capture {
            Capture::Match => self.regex.find(text).map(|m| m.as_str().to_string()),
            Capture::Trimmed => self.regex.find(text).map(|m| m.as_str().trim().to_string()),
            Capture::Group(index) => self
                .regex
                .captures(text)
                .and_then(|caps| caps.get(index))
                .map(|m| m.as_str().to_string()),
        }
    }
}

// ============================================================================
// Built-in Rules
// ============================================================================

pub const BENEFICIARY_CHANGE: &str = "beneficiary_change";
pub const ADDRESS_CHANGE: &str = "address_change";

/// Default rule table for the customer-request domain
pub fn builtin_specs() -> Vec<RuleSpec> {
    vec![
        // Beneficiary change
        RuleSpec::new("policy_number", r"policy\s+number\s+(\d+)")
            .for_category(BENEFICIARY_CHANGE)
            .case_insensitive()
            .capture(Capture::Group(1)),
        RuleSpec::new(
            "beneficiary_name",
            // Letter classes also admit the dotted and dotless i, long s and Kelvin
            // sign, which fold onto ASCII letters under Unicode-aware ignore-case
            r"(?:beneficiary\s+)?(?:to|with)\s+(?:my\s+)?(?:wife|husband|son|daughter)?\s*([A-Z\x{130}\x{131}\x{17F}\x{212A}][a-z\x{130}\x{131}\x{17F}\x{212A}]+\s+[A-Z\x{130}\x{131}\x{17F}\x{212A}][a-z\x{130}\x{131}\x{17F}\x{212A}]+)",
        )
        .for_category(BENEFICIARY_CHANGE)
        .case_insensitive()
        .capture(Capture::Group(1)),
        // Address change
        RuleSpec::new(
            "new_address",
            r"\d+\s+[\w\s]+(?:Street|St|Road|Rd|Lane|Ln|Avenue|Ave|Drive|Dr)",
        )
        .for_category(ADDRESS_CHANGE)
        .case_insensitive()
        .capture(Capture::Trimmed),
        RuleSpec::new(
            "effective_date",
            r"\beffective\s+(?:from\s+)?(?:\w+\s+\d{4}|next\s+\w+|immediately)",
        )
        .for_category(ADDRESS_CHANGE)
        .case_insensitive(),
        // Contact details, any category
        // \s plus the ASCII information separators (U+001C..U+001F)
        RuleSpec::new("phone_number", r"\+?\d[\d\s\x1C-\x1F-]{7,}"),
        RuleSpec::new("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
    ]
}

// ============================================================================
// Rule Set
// ============================================================================

/// On-disk rules file: a list of `[[rule]]` tables
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RuleSpec>,
}

/// Category-indexed collection of compiled rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Category label -> rules in declaration order
    by_category: HashMap<String, Vec<ExtractionRule>>,
    /// Category labels in first-seen order
    categories: Vec<String>,
    /// Rules applied to every category
    global: Vec<ExtractionRule>,
}

impl RuleSet {
    /// Compile a rule set, failing on the first invalid rule
    pub fn from_specs(specs: impl IntoIterator<Item = RuleSpec>) -> Result<Self> {
        let mut set = Self::default();

        for spec in specs {
            let rule = spec.compile()?;
            match rule.scope.clone() {
                RuleScope::Global => set.global.push(rule),
                RuleScope::Category(category) => {
                    if !set.by_category.contains_key(&category) {
                        set.categories.push(category.clone());
                    }
                    set.by_category.entry(category).or_default().push(rule);
                }
            }
        }

        Ok(set)
    }

    /// The built-in customer-request rules
    pub fn builtin() -> Result<Self> {
        Self::from_specs(builtin_specs())
    }

    /// Load rules from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IxtError::Config(format!("failed to read rules file {}: {e}", path.display()))
        })?;

        Self::from_toml(&content)
            .map_err(|e| IxtError::Config(format!("rules file {}: {e}", path.display())))
    }

    /// Parse rules from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: RuleFile =
            toml::from_str(content).map_err(|e| IxtError::Config(e.to_string()))?;
        Self::from_specs(file.rules)
    }

    /// Rules evaluated for a category: its own rules first, then the global ones
    pub fn rules_for<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a ExtractionRule> {
        self.by_category
            .get(category)
            .into_iter()
            .flatten()
            .chain(self.global.iter())
    }

    /// Every rule, category rules first
    pub fn iter(&self) -> impl Iterator<Item = &ExtractionRule> {
        self.categories
            .iter()
            .filter_map(|c| self.by_category.get(c))
            .flatten()
            .chain(self.global.iter())
    }

    /// Categories that have specific rules
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.by_category.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
