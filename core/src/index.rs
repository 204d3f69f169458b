use crate::corpus::CorpusStore;
use crate::query::normalize_keyword;
use crate::ClusterId;
use std::collections::{BTreeSet, HashMap};

static NO_CLUSTERS: BTreeSet<ClusterId> = BTreeSet::new();

/// Normalized keyword -> ids of the clusters whose keyword set contains it.
///
/// Built wholesale from a [`CorpusStore`] and never patched afterwards; a
/// changed corpus means building a new index.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, BTreeSet<ClusterId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn build(corpus: &CorpusStore) -> Self {
        let mut postings: HashMap<String, BTreeSet<ClusterId>> = HashMap::new();
        for (cluster_id, keywords) in corpus.keyword_sets() {
            for kw in keywords {
                postings.entry(normalize_keyword(kw)).or_default().insert(cluster_id.clone());
            }
        }
        tracing::debug!(terms = postings.len(), "keyword index built");
        Self { postings }
    }

    /// Clusters containing `keyword` (already normalized); empty if none.
    pub fn lookup(&self, keyword: &str) -> &BTreeSet<ClusterId> {
        self.postings.get(keyword).unwrap_or(&NO_CLUSTERS)
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> CorpusStore {
        let kws: HashMap<String, Vec<String>> = [
            ("1".to_string(), vec!["bone".to_string(), "spaceflight".to_string()]),
            ("2".to_string(), vec!["Spaceflight".to_string(), "root".to_string()]),
        ]
        .into_iter()
        .collect();
        CorpusStore::from_parts(HashMap::new(), HashMap::new(), [kws])
    }

    #[test]
    fn lookup_returns_every_owning_cluster() {
        let idx = InvertedIndex::build(&corpus());
        let hits: Vec<&str> = idx.lookup("spaceflight").iter().map(String::as_str).collect();
        assert_eq!(hits, vec!["1", "2"]);
        assert_eq!(idx.lookup("root").len(), 1);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn missing_keyword_is_empty() {
        let idx = InvertedIndex::build(&corpus());
        assert!(idx.lookup("xenobotany").is_empty());
        assert!(InvertedIndex::new().is_empty());
    }
}
