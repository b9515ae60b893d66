//! Classification of engine error text into user-facing errors
//!
//! Engines only report free text here, so classification is an ordered list
//! of substring rules. The first rule whose patterns all occur wins; text no
//! rule recognizes passes through unchanged.

use crate::error::{ConsoleError, EngineError, ErrorCategory};

/// One classification rule: every pattern must occur in the message
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRule {
    pub patterns: Vec<String>,
    pub category: ErrorCategory,
}

impl TranslationRule {
    pub fn new<I, S>(category: ErrorCategory, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            category,
        }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.patterns.iter().all(|pattern| message.contains(pattern.as_str()))
    }
}

/// Ordered rule list mapping engine errors to [`ConsoleError`]s
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    table: String,
    rules: Vec<TranslationRule>,
}

impl ErrorTranslator {
    /// Default rules for a dataset table
    pub fn new(table: &str) -> Self {
        let rules = vec![
            TranslationRule::new(ErrorCategory::SqlSyntaxError, ["Parser Error"]),
            TranslationRule::new(ErrorCategory::DatasetNotFound, ["Catalog Error", table]),
            TranslationRule::new(ErrorCategory::InvalidColumnReference, ["Binder Error"]),
            TranslationRule::new(ErrorCategory::MemoryLimitExceeded, ["Out of Memory"]),
        ];

        Self {
            table: table.to_string(),
            rules,
        }
    }

    /// Append rules, checked after the existing ones
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = TranslationRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[TranslationRule] {
        &self.rules
    }

    /// Classify an engine error
    pub fn translate(&self, error: &EngineError) -> ConsoleError {
        let message = error.message.as_str();
        let category = self.rules
            .iter()
            .find(|rule| rule.matches(message))
            .map(|rule| rule.category)
            .unwrap_or(ErrorCategory::UnknownEngineError);

        match category {
            ErrorCategory::SqlSyntaxError => ConsoleError::SqlSyntaxError {
                message: message.lines().next().unwrap_or_default().to_string(),
            },
            ErrorCategory::DatasetNotFound => ConsoleError::DatasetNotFound {
                table: self.table.clone(),
            },
            ErrorCategory::InvalidColumnReference => ConsoleError::InvalidColumnReference,
            ErrorCategory::MemoryLimitExceeded => ConsoleError::MemoryLimitExceeded,
            ErrorCategory::EngineInitFailure => ConsoleError::EngineInitFailure {
                message: message.to_string(),
            },
            // Admission categories never come from the engine
            _ => ConsoleError::UnknownEngineError {
                message: message.to_string(),
            },
        }
    }
}
