use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use topicrank_core::config::{DEFAULT_ARTICLE_TOP_N, DEFAULT_CLUSTER_TOP_N};
use topicrank_core::{parse_keyword_list, CorpusPaths, Engine, Vocabulary};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the keyword index over a cluster corpus and query it", long_about = None)]
struct Cli {
    /// Corpus directory holding the article, cluster and keyword JSON files
    #[arg(long, default_value = "./resources")]
    corpus: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print corpus and index statistics
    Stats {
        /// Number of largest clusters to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Rank clusters for comma-separated keywords
    Clusters {
        #[arg(long)]
        keywords: String,
        #[arg(long, default_value_t = DEFAULT_CLUSTER_TOP_N)]
        top: usize,
    },
    /// Rank articles for comma-separated keywords
    Articles {
        #[arg(long)]
        keywords: String,
        #[arg(long, default_value_t = DEFAULT_ARTICLE_TOP_N)]
        top: usize,
    },
    /// Map free-form keyword text onto the corpus vocabulary
    Resolve {
        #[arg(long)]
        text: String,
    },
}

#[derive(Serialize)]
struct ClusterSize<'a> {
    cluster_id: &'a str,
    articles: usize,
    keywords: usize,
}

#[derive(Serialize)]
struct Stats<'a> {
    clusters: usize,
    articles: usize,
    keyword_memberships: usize,
    unique_keywords: usize,
    largest_clusters: Vec<ClusterSize<'a>>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let paths = CorpusPaths::new(&cli.corpus);
    let engine = Engine::load(&paths)?;

    match cli.command {
        Commands::Stats { top } => print_stats(&engine, top),
        Commands::Clusters { keywords, top } => {
            let ranking = engine.rank_clusters(&parse_keyword_list(&keywords), top);
            print_json(&ranking)
        }
        Commands::Articles { keywords, top } => {
            let ranking = engine.rank_articles(&parse_keyword_list(&keywords), top);
            print_json(&ranking)
        }
        Commands::Resolve { text } => {
            let vocabulary = Vocabulary::load(&paths, engine.index())?;
            let keywords = vocabulary.validate(&parse_keyword_list(&text));
            tracing::info!(vocabulary = vocabulary.len(), resolved = keywords.len(), "keywords resolved");
            print_json(&keywords)
        }
    }
}

fn print_stats(engine: &Engine, top: usize) -> Result<()> {
    let corpus = engine.corpus();
    let mut sizes: Vec<ClusterSize> = corpus
        .cluster_ids()
        .into_iter()
        .map(|id| ClusterSize {
            cluster_id: id.as_str(),
            articles: corpus.articles_of(id).len(),
            keywords: corpus.keywords_of(id).len(),
        })
        .collect();
    sizes.sort_by(|a, b| b.articles.cmp(&a.articles));
    sizes.truncate(top);
    print_json(&Stats {
        clusters: corpus.num_clusters(),
        articles: corpus.num_articles(),
        keyword_memberships: corpus.num_keywords(),
        unique_keywords: engine.index().len(),
        largest_clusters: sizes,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
