//! Ranking constants.
//!
//! Runtime settings (corpus location, bind address, admin token) are handled
//! by the binaries through CLI arguments and environment variables.

/// Maximum number of query keywords considered; extra keywords are dropped.
pub const MAX_QUERY_KEYWORDS: usize = 5;

/// Share of an article's score that comes from cluster membership alone.
pub const CLUSTER_WEIGHT: f64 = 0.8;

/// Share of an article's score contributed by query terms found in its title.
///
/// `CLUSTER_WEIGHT + TITLE_BOOST_WEIGHT` must equal 1.0 so scores stay in (0, 1].
pub const TITLE_BOOST_WEIGHT: f64 = 0.2;

/// Decimal places kept on article scores.
pub const SCORE_DECIMALS: i32 = 4;

/// Default number of clusters returned when the caller does not ask.
pub const DEFAULT_CLUSTER_TOP_N: usize = 5;

/// Default number of articles returned when the caller does not ask.
pub const DEFAULT_ARTICLE_TOP_N: usize = 5;

/// Upper bound for `top_n` accepted by the HTTP service.
pub const MAX_TOP_N: usize = 100;
