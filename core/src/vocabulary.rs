//! Mapping free-form extracted keywords onto the corpus vocabulary.

use crate::config::MAX_QUERY_KEYWORDS;
use crate::corpus::{load_vocabulary, CorpusPaths};
use crate::error::DataLoadError;
use crate::index::InvertedIndex;
use crate::query::normalize_keyword;
use std::collections::{BTreeSet, HashSet};

/// Split extractor output into normalized keywords.
///
/// Accepts a JSON array of strings (`["dna", "metabolism"]`) or a plain
/// comma-separated list (`dna, metabolism`).
pub fn parse_keyword_list(text: &str) -> Vec<String> {
    let text = text.trim();
    let items: Vec<String> = if text.starts_with('[') && text.ends_with(']') {
        serde_json::from_str::<Vec<String>>(text)
            .unwrap_or_else(|_| text[1..text.len() - 1].split(',').map(str::to_string).collect())
    } else {
        text.split(',').map(str::to_string).collect()
    };
    items
        .iter()
        .map(|s| normalize_keyword(s.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())))
        .filter(|s| !s.is_empty())
        .collect()
}

/// The set of keywords a query may use.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    terms: BTreeSet<String>,
}

impl Vocabulary {
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| normalize_keyword(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Read `keywords.json`, falling back to the index terms when it is absent.
    pub fn load(paths: &CorpusPaths, index: &InvertedIndex) -> Result<Self, DataLoadError> {
        match load_vocabulary(paths)? {
            Some(terms) => Ok(Self::from_terms(terms)),
            None => {
                tracing::info!("no vocabulary file, using index keywords");
                Ok(Self::from_terms(index.terms()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.terms.contains(keyword)
    }

    /// Exact match, else the best partial match: an entry containing the
    /// keyword or contained in it. Shorter entries win, then lexicographic order.
    pub fn resolve(&self, keyword: &str) -> Option<&str> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return None;
        }
        if let Some(exact) = self.terms.get(&keyword) {
            return Some(exact.as_str());
        }
        self.terms
            .iter()
            .filter(|t| t.contains(keyword.as_str()) || keyword.contains(t.as_str()))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(String::as_str)
    }

    /// Resolve each keyword, drop unknown and repeated ones, keep at most five.
    pub fn validate<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for kw in keywords {
            let Some(term) = self.resolve(kw.as_ref()) else {
                tracing::debug!(keyword = kw.as_ref(), "keyword not in vocabulary");
                continue;
            };
            if seen.insert(term) {
                out.push(term.to_string());
            }
            if out.len() == MAX_QUERY_KEYWORDS {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_terms(["DNA", "metabolism", "bone", "bone loss", "microgravity", "cell"])
    }

    #[test]
    fn parses_comma_list_and_json_array() {
        assert_eq!(parse_keyword_list("DNA, metabolism ,"), vec!["dna", "metabolism"]);
        assert_eq!(parse_keyword_list(r#"["Bone Loss", "cell"]"#), vec!["bone loss", "cell"]);
        assert_eq!(parse_keyword_list("['bone', 'cell']"), vec!["bone", "cell"]);
        assert!(parse_keyword_list("   ").is_empty());
    }

    #[test]
    fn resolve_prefers_exact_then_shortest() {
        let v = vocab();
        assert_eq!(v.resolve("Bone"), Some("bone"));
        // "bon" is contained in both "bone" and "bone loss"
        assert_eq!(v.resolve("bon"), Some("bone"));
        // "cells" contains "cell"
        assert_eq!(v.resolve("cells"), Some("cell"));
        assert_eq!(v.resolve("xenobotany"), None);
        assert_eq!(v.resolve("  "), None);
    }

    #[test]
    fn validate_dedups_and_caps() {
        let v = vocab();
        let out = v.validate(&["bone", "BONE", "bon", "dna", "unknown", "cell", "metabolism", "microgravity"]);
        assert_eq!(out, vec!["bone", "dna", "cell", "metabolism", "microgravity"]);
    }
}
