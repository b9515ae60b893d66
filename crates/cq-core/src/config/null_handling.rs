//! Which CSV cells load as database NULL

use serde::{Serialize, Deserialize};

/// Cell texts that load as NULL instead of a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    pub patterns: Vec<String>,

    /// Compare after trimming surrounding whitespace
    pub trim_whitespace: bool,

    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        // Only empty cells. Sentinels like "N/A" stay text unless configured.
        Self {
            patterns: vec![String::new()],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    pub fn is_null(&self, cell: &str) -> bool {
        let cell = if self.trim_whitespace { cell.trim() } else { cell };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                cell == pattern
            } else {
                cell.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Treat `pattern` as NULL too. Duplicates are ignored.
    pub fn add_pattern(&mut self, pattern: String) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_only_blank_is_null() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("   "));
        assert!(!config.is_null("NULL"));
        assert!(!config.is_null("N/A"));
    }

    #[test]
    fn test_added_patterns() {
        let mut config = NullConfig::default();
        config.add_pattern("n/a".to_string());
        config.add_pattern("n/a".to_string());
        assert_eq!(config.patterns.len(), 2);
        assert!(config.is_null(" N/A "));

        config.case_sensitive = true;
        assert!(!config.is_null("N/A"));
        assert!(config.is_null("n/a"));
    }

    #[test]
    fn test_partial_json() {
        let config: NullConfig = serde_json::from_str(r#"{"patterns": ["", "-"]}"#).unwrap();
        assert!(config.is_null("-"));
        assert!(config.trim_whitespace);
    }
}
