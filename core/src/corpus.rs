use crate::error::DataLoadError;
use crate::query::normalize_keyword;
use crate::{ArticleId, ClusterId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

static NO_KEYWORDS: BTreeSet<String> = BTreeSet::new();

#[derive(Debug, Deserialize)]
struct ArticlesFile {
    articles: HashMap<ArticleId, String>,
}

#[derive(Debug, Deserialize)]
struct ClustersFile {
    clusters: HashMap<ClusterId, Vec<ArticleId>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VocabularyFile {
    Bare(Vec<String>),
    Wrapped { keywords: Vec<String> },
}

/// Locations of the corpus files inside a corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusPaths {
    pub root: PathBuf,
}

impl CorpusPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn titles(&self) -> PathBuf { self.root.join("articlesName_PMC.json") }
    pub fn clusters(&self) -> PathBuf { self.root.join("clustersPMC.json") }
    pub fn unigrams(&self) -> PathBuf { self.root.join("unigramKeywords.json") }
    pub fn bigrams(&self) -> PathBuf { self.root.join("bigramKeywords.json") }
    pub fn vocabulary(&self) -> PathBuf { self.root.join("keywords.json") }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DataLoadError::Missing { path: path.to_path_buf() },
        _ => DataLoadError::Io { path: path.to_path_buf(), source },
    })?;
    serde_json::from_str(&text).map_err(|source| DataLoadError::Malformed { path: path.to_path_buf(), source })
}

pub fn load_titles(paths: &CorpusPaths) -> Result<HashMap<ArticleId, String>, DataLoadError> {
    let file: ArticlesFile = read_json(&paths.titles())?;
    Ok(file.articles)
}

pub fn load_clusters(paths: &CorpusPaths) -> Result<HashMap<ClusterId, Vec<ArticleId>>, DataLoadError> {
    let file: ClustersFile = read_json(&paths.clusters())?;
    Ok(file.clusters)
}

/// Load one cluster keyword source (`cluster_id -> [keyword]`).
pub fn load_keywords(path: &Path) -> Result<HashMap<ClusterId, Vec<String>>, DataLoadError> {
    read_json(path)
}

/// Load the optional keyword vocabulary. `Ok(None)` when the file is absent.
pub fn load_vocabulary(paths: &CorpusPaths) -> Result<Option<Vec<String>>, DataLoadError> {
    match read_json::<VocabularyFile>(&paths.vocabulary()) {
        Ok(VocabularyFile::Bare(keywords)) | Ok(VocabularyFile::Wrapped { keywords }) => Ok(Some(keywords)),
        Err(DataLoadError::Missing { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read-only article and cluster mappings, loaded once.
#[derive(Debug, Default)]
pub struct CorpusStore {
    titles: HashMap<ArticleId, String>,
    cluster_articles: HashMap<ClusterId, Vec<ArticleId>>,
    /// cluster id -> normalized union of single-word and phrase keywords
    cluster_keywords: HashMap<ClusterId, BTreeSet<String>>,
}

impl CorpusStore {
    /// Load every required corpus file under `paths.root`.
    pub fn load(paths: &CorpusPaths) -> Result<Self, DataLoadError> {
        let titles = load_titles(paths)?;
        let clusters = load_clusters(paths)?;
        let unigrams = load_keywords(&paths.unigrams())?;
        let bigrams = load_keywords(&paths.bigrams())?;
        let store = Self::from_parts(titles, clusters, [unigrams, bigrams]);
        tracing::info!(
            root = %paths.root.display(),
            clusters = store.num_clusters(),
            articles = store.num_articles(),
            keywords = store.num_keywords(),
            "corpus loaded"
        );
        Ok(store)
    }

    /// Assemble a store from in-memory mappings. Keyword sources are merged
    /// per cluster after normalization; blank keywords are dropped.
    pub fn from_parts<I>(
        titles: HashMap<ArticleId, String>,
        cluster_articles: HashMap<ClusterId, Vec<ArticleId>>,
        keyword_sources: I,
    ) -> Self
    where
        I: IntoIterator<Item = HashMap<ClusterId, Vec<String>>>,
    {
        let mut cluster_keywords: HashMap<ClusterId, BTreeSet<String>> = HashMap::new();
        for source in keyword_sources {
            for (cluster_id, keywords) in source {
                let set = cluster_keywords.entry(cluster_id).or_default();
                for kw in keywords {
                    let kw = normalize_keyword(&kw);
                    if !kw.is_empty() {
                        set.insert(kw);
                    }
                }
            }
        }
        Self { titles, cluster_articles, cluster_keywords }
    }

    pub fn title_of(&self, article_id: &str) -> Option<&str> {
        self.titles.get(article_id).map(String::as_str)
    }

    /// Article ids of a cluster; empty for an unknown cluster.
    pub fn articles_of(&self, cluster_id: &str) -> &[ArticleId] {
        self.cluster_articles.get(cluster_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Normalized keyword set of a cluster; empty for an unknown cluster.
    pub fn keywords_of(&self, cluster_id: &str) -> &BTreeSet<String> {
        self.cluster_keywords.get(cluster_id).unwrap_or(&NO_KEYWORDS)
    }

    /// Every cluster named by a keyword source, with its keyword set.
    pub fn keyword_sets(&self) -> impl Iterator<Item = (&ClusterId, &BTreeSet<String>)> {
        self.cluster_keywords.iter()
    }

    /// Cluster ids known from either the article or the keyword mappings, sorted.
    pub fn cluster_ids(&self) -> BTreeSet<&ClusterId> {
        self.cluster_articles.keys().chain(self.cluster_keywords.keys()).collect()
    }

    pub fn num_clusters(&self) -> usize {
        self.cluster_ids().len()
    }

    pub fn num_articles(&self) -> usize {
        self.titles.len()
    }

    /// Keyword memberships summed over clusters.
    pub fn num_keywords(&self) -> usize {
        self.cluster_keywords.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn merges_and_normalizes_keyword_sources() {
        let uni = map(&[("1", &["Bone", " microgravity "])]);
        let bi = map(&[("1", &["bone loss", "BONE", "  "]), ("2", &["root growth"])]);
        let store = CorpusStore::from_parts(HashMap::new(), HashMap::new(), [uni, bi]);

        let kws: Vec<&str> = store.keywords_of("1").iter().map(String::as_str).collect();
        assert_eq!(kws, vec!["bone", "bone loss", "microgravity"]);
        assert_eq!(store.keywords_of("2").len(), 1);
        assert!(store.keywords_of("missing").is_empty());
        assert_eq!(store.num_keywords(), 4);
    }

    #[test]
    fn unknown_cluster_has_no_articles() {
        let clusters = map(&[("7", &["PMC1", "PMC2"])]);
        let mut titles = HashMap::new();
        titles.insert("PMC1".to_string(), "A title".to_string());
        let store = CorpusStore::from_parts(titles, clusters, Vec::new());

        assert_eq!(store.articles_of("7"), ["PMC1".to_string(), "PMC2".to_string()]);
        assert!(store.articles_of("8").is_empty());
        assert_eq!(store.title_of("PMC1"), Some("A title"));
        assert_eq!(store.title_of("PMC2"), None);
        assert_eq!(store.num_clusters(), 1);
    }
}
