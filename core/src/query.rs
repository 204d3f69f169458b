use crate::config::MAX_QUERY_KEYWORDS;

/// Canonical index key: lowercased, surrounding whitespace removed.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// A caller's keyword list after truncation and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Lowercased but otherwise untouched keywords, used for title matching.
    raw: Vec<String>,
    /// Index keys, parallel to `raw`.
    normalized: Vec<String>,
    dropped: usize,
}

impl Query {
    /// Keep the first [`MAX_QUERY_KEYWORDS`] keywords. Entries that are blank
    /// once normalized still count toward the query length; they never match.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let dropped = keywords.len().saturating_sub(MAX_QUERY_KEYWORDS);
        if dropped > 0 {
            tracing::warn!(received = keywords.len(), kept = MAX_QUERY_KEYWORDS, "query truncated");
        }
        let mut raw = Vec::new();
        let mut normalized = Vec::new();
        for kw in keywords.iter().take(MAX_QUERY_KEYWORDS) {
            let kw = kw.as_ref();
            raw.push(kw.to_lowercase());
            normalized.push(normalize_keyword(kw));
        }
        Self { raw, normalized, dropped }
    }

    /// True when no entry can match anything: no keywords, or only blank ones.
    pub fn is_empty(&self) -> bool {
        self.normalized.iter().all(String::is_empty)
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }

    /// Normalized keywords worth looking up in the index.
    pub fn lookup_terms(&self) -> impl Iterator<Item = &String> {
        self.normalized.iter().filter(|kw| !kw.is_empty())
    }

    /// Number of keywords cut off by the length limit.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Fraction of query keywords that occur literally in `title`, ignoring case.
    pub fn title_boost(&self, title: &str) -> f64 {
        if self.raw.is_empty() {
            return 0.0;
        }
        let title = title.to_lowercase();
        let hits = self.raw.iter().filter(|kw| title.contains(kw.as_str())).count();
        hits as f64 / self.raw.len() as f64
    }
}
