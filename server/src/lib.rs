use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use topicrank_core::config::{DEFAULT_ARTICLE_TOP_N, DEFAULT_CLUSTER_TOP_N, MAX_TOP_N};
use topicrank_core::{parse_keyword_list, ArticleHit, ClusterHit, CorpusPaths, Engine, Ranking, Vocabulary};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    /// Comma-separated keywords
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse<T> {
    pub query: String,
    pub input_keywords: Vec<String>,
    pub dropped_keywords: usize,
    pub took_s: f64,
    pub results: Vec<T>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub input: String,
    pub keywords: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub clusters: usize,
    pub articles: usize,
    pub keywords: usize,
    pub loaded_at: String,
}

/// One loaded corpus with everything derived from it.
pub struct Snapshot {
    pub engine: Engine,
    pub vocabulary: Vocabulary,
    pub loaded_at: String,
}

pub fn load_snapshot(root: &Path) -> Result<Snapshot> {
    let paths = CorpusPaths::new(root);
    let engine = Engine::load(&paths).with_context(|| format!("loading corpus from {}", root.display()))?;
    let vocabulary = Vocabulary::load(&paths, engine.index())?;
    let loaded_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "".into());
    Ok(Snapshot { engine, vocabulary, loaded_at })
}

#[derive(Clone)]
pub struct AppState {
    pub corpus_root: PathBuf,
    /// Replaced wholesale on reload; readers keep the snapshot they cloned.
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn load(corpus_root: PathBuf, admin_token: Option<String>) -> Result<Self> {
        let snapshot = load_snapshot(&corpus_root)?;
        Ok(Self { corpus_root, snapshot: Arc::new(RwLock::new(Arc::new(snapshot))), admin_token })
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    fn swap(&self, snapshot: Snapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
    }
}

pub fn build_app(corpus_dir: String, timeout: Duration) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::load(PathBuf::from(&corpus_dir), admin_token)?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(state, timeout).layer(cors))
}

pub fn router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/clusters", get(clusters_handler))
        .route("/articles", get(articles_handler))
        .route("/keywords/resolve", get(resolve_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.current();
    let corpus = snapshot.engine.corpus();
    Json(HealthResponse {
        status: "healthy",
        clusters: corpus.num_clusters(),
        articles: corpus.num_articles(),
        keywords: snapshot.engine.index().len(),
        loaded_at: snapshot.loaded_at.clone(),
    })
}

pub async fn clusters_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse<ClusterHit>> {
    let k = clamp_k(params.k, DEFAULT_CLUSTER_TOP_N);
    search(&state, params.q, |engine, keywords| engine.rank_clusters(keywords, k))
}

pub async fn articles_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse<ArticleHit>> {
    let k = clamp_k(params.k, DEFAULT_ARTICLE_TOP_N);
    search(&state, params.q, |engine, keywords| engine.rank_articles(keywords, k))
}

fn search<T>(state: &AppState, q: String, rank: impl FnOnce(&Engine, &[String]) -> Ranking<T>) -> Json<SearchResponse<T>> {
    let start = std::time::Instant::now();
    let snapshot = state.current();
    let input_keywords = parse_keyword_list(&q);
    let ranking = rank(&snapshot.engine, &input_keywords);
    Json(SearchResponse {
        query: q,
        input_keywords,
        dropped_keywords: ranking.dropped_keywords,
        took_s: start.elapsed().as_secs_f64(),
        results: ranking.hits,
    })
}

fn clamp_k(k: Option<usize>, default: usize) -> usize {
    k.unwrap_or(default).clamp(1, MAX_TOP_N)
}

pub async fn resolve_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<ResolveResponse> {
    let snapshot = state.current();
    let keywords = snapshot.vocabulary.validate(&parse_keyword_list(&params.q));
    Json(ResolveResponse { input: params.q, keywords })
}

/// Load the corpus again off to the side and swap it in. A failed load
/// leaves the current snapshot serving.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let root = state.corpus_root.clone();
    let snapshot = tokio::task::spawn_blocking(move || load_snapshot(&root))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "corpus reload failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        })?;
    state.swap(snapshot);
    tracing::info!(root = %state.corpus_root.display(), "corpus reloaded");
    Ok(health_handler(State(state)).await)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
