//! Cluster and article ranking over a loaded corpus.
//!
//! Both rankers share the same first stage: every normalized query keyword is
//! looked up in the [`InvertedIndex`] and each cluster accumulates a match
//! count. A cluster's score is `matched / query_len`.
//!
//! Ties are broken deterministically. Clusters with equal scores are ordered
//! by ascending id. Articles with equal scores keep the order in which they
//! were collected (cluster order, then the cluster's own article order).

use crate::config::{CLUSTER_WEIGHT, SCORE_DECIMALS, TITLE_BOOST_WEIGHT};
use crate::corpus::{CorpusPaths, CorpusStore};
use crate::error::DataLoadError;
use crate::index::InvertedIndex;
use crate::query::Query;
use crate::{ArticleId, ClusterId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterHit {
    pub cluster_id: ClusterId,
    /// matched query keywords / query length, in (0, 1]
    pub relevance_score: f64,
    pub matched_keywords: BTreeSet<String>,
    pub total_keywords_in_cluster: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleHit {
    pub article_id: ArticleId,
    pub title: String,
    pub relevance_score: f64,
    /// Highest ranked matching cluster that contains the article.
    pub cluster_id: ClusterId,
    /// Query keywords matched by `cluster_id`, not necessarily present in the title.
    pub matched_keywords: BTreeSet<String>,
}

/// Ranked hits plus the number of query keywords dropped by the length limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking<T> {
    pub hits: Vec<T>,
    pub dropped_keywords: usize,
}

impl<T> Ranking<T> {
    fn empty(query: &Query) -> Self {
        Self { hits: Vec::new(), dropped_keywords: query.dropped() }
    }
}

#[derive(Debug)]
struct ClusterMatch<'a> {
    cluster_id: &'a ClusterId,
    count: usize,
    keywords: BTreeSet<String>,
}

/// Corpus plus its keyword index. Immutable once built, safe to share across threads.
#[derive(Debug)]
pub struct Engine {
    corpus: Arc<CorpusStore>,
    index: InvertedIndex,
}

impl Engine {
    pub fn new(corpus: Arc<CorpusStore>) -> Self {
        let index = InvertedIndex::build(&corpus);
        Self { corpus, index }
    }

    pub fn load(paths: &CorpusPaths) -> Result<Self, DataLoadError> {
        let corpus = CorpusStore::load(paths)?;
        Ok(Self::new(Arc::new(corpus)))
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Clusters sorted by descending match count, then ascending id.
    fn match_clusters(&self, query: &Query) -> Vec<ClusterMatch<'_>> {
        let mut by_cluster: BTreeMap<&ClusterId, (usize, BTreeSet<String>)> = BTreeMap::new();
        for kw in query.lookup_terms() {
            for cluster_id in self.index.lookup(kw) {
                let entry = by_cluster.entry(cluster_id).or_default();
                entry.0 += 1;
                entry.1.insert(kw.clone());
            }
        }
        let mut matches: Vec<ClusterMatch<'_>> = by_cluster
            .into_iter()
            .map(|(cluster_id, (count, keywords))| ClusterMatch { cluster_id, count, keywords })
            .collect();
        // stable: equal counts stay in id order
        matches.sort_by(|a, b| b.count.cmp(&a.count));
        matches
    }

    /// Rank clusters by the share of query keywords they contain.
    pub fn rank_clusters<S: AsRef<str>>(&self, keywords: &[S], top_n: usize) -> Ranking<ClusterHit> {
        let query = Query::new(keywords);
        if query.is_empty() || top_n == 0 {
            return Ranking::empty(&query);
        }
        let query_len = query.len() as f64;
        let hits = self
            .match_clusters(&query)
            .into_iter()
            .take(top_n)
            .map(|m| ClusterHit {
                cluster_id: m.cluster_id.clone(),
                relevance_score: m.count as f64 / query_len,
                matched_keywords: m.keywords,
                total_keywords_in_cluster: self.corpus.keywords_of(m.cluster_id).len(),
            })
            .collect();
        Ranking { hits, dropped_keywords: query.dropped() }
    }

    /// Rank articles from every matching cluster, boosting titles that
    /// literally contain query keywords.
    pub fn rank_articles<S: AsRef<str>>(&self, keywords: &[S], top_n: usize) -> Ranking<ArticleHit> {
        let query = Query::new(keywords);
        if query.is_empty() || top_n == 0 {
            return Ranking::empty(&query);
        }
        let matches = self.match_clusters(&query);
        let query_len = query.len() as f64;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates: Vec<ArticleHit> = Vec::new();
        for m in &matches {
            let cluster_score = m.count as f64 / query_len;
            for article_id in self.corpus.articles_of(m.cluster_id) {
                if !seen.insert(article_id.as_str()) {
                    continue;
                }
                let Some(title) = self.corpus.title_of(article_id).filter(|t| !t.is_empty()) else {
                    continue;
                };
                let boost = query.title_boost(title);
                candidates.push(ArticleHit {
                    article_id: article_id.clone(),
                    title: title.to_string(),
                    relevance_score: round_score(cluster_score * (CLUSTER_WEIGHT + TITLE_BOOST_WEIGHT * boost)),
                    cluster_id: m.cluster_id.clone(),
                    matched_keywords: m.keywords.clone(),
                });
            }
        }
        tracing::debug!(clusters = matches.len(), candidates = candidates.len(), "articles collected");

        candidates.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        candidates.truncate(top_n);
        Ranking { hits: candidates, dropped_keywords: query.dropped() }
    }
}

fn round_score(score: f64) -> f64 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    (score * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_four_places() {
        assert_eq!(round_score(0.866_666), 0.8667);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn empty_engine_matches_nothing() {
        let engine = Engine::new(Arc::new(CorpusStore::default()));
        assert!(engine.rank_clusters(&["bone"], 3).hits.is_empty());
        assert!(engine.rank_articles(&["bone"], 3).hits.is_empty());
    }
}
