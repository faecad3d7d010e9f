//! Shared data types for both import paths

use serde::{Deserialize, Serialize};

/// A single (word, definition) pair
///
/// Both sides are trimmed and non-empty; use [`TermPair::new`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPair {
    pub word: String,
    pub definition: String,
}

impl TermPair {
    /// Build a pair from raw text, returning `None` if either side is blank
    pub fn new(word: &str, definition: &str) -> Option<Self> {
        let word = word.trim();
        let definition = definition.trim();
        if word.is_empty() || definition.is_empty() {
            return None;
        }
        Some(Self {
            word: word.to_string(),
            definition: definition.to_string(),
        })
    }
}

/// Terms and title recovered from a set page
///
/// `title` may be empty; the storage layer supplies a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub title: String,
    pub terms: Vec<TermPair>,
}

/// Caller options for a URL import
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Reserved for session-scoped import variants
    #[serde(default)]
    pub session: bool,
    /// Overrides the creation timestamp (milliseconds since the epoch)
    #[serde(default)]
    pub published_timestamp: Option<i64>,
}

/// Classification of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { html: String, status: u16 },
    Blocked { status: u16, html: String },
    HttpError { status: u16 },
}

/// What the caller gets back once the set has been stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created_set_id: String,
    pub title: String,
    pub terms: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_pair_trims_sides() {
        let pair = TermPair::new("  foo ", "\tbar\n").unwrap();
        assert_eq!(pair.word, "foo");
        assert_eq!(pair.definition, "bar");
    }

    #[test]
    fn test_term_pair_rejects_blank_side() {
        assert!(TermPair::new("foo", "   ").is_none());
        assert!(TermPair::new("", "bar").is_none());
    }

    #[test]
    fn test_import_options_from_json() {
        let opts: ImportOptions =
            serde_json::from_str(r#"{"publishedTimestamp": 1700000000000}"#).unwrap();
        assert!(!opts.session);
        assert_eq!(opts.published_timestamp, Some(1_700_000_000_000));
    }
}
