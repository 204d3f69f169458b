//! Keyword indexing and ranking over a fixed corpus of clustered articles.
//!
//! The corpus is loaded once from static JSON files into a [`CorpusStore`],
//! an [`InvertedIndex`] maps each normalized keyword to the clusters that
//! carry it, and an [`Engine`] ranks either clusters or articles for a small
//! set of query keywords.

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod query;
pub mod rank;
pub mod vocabulary;

pub use corpus::{CorpusPaths, CorpusStore};
pub use error::DataLoadError;
pub use index::InvertedIndex;
pub use query::{normalize_keyword, Query};
pub use rank::{ArticleHit, ClusterHit, Engine, Ranking};
pub use vocabulary::{parse_keyword_list, Vocabulary};

pub type ArticleId = String;
pub type ClusterId = String;
