/// Scoring and aggregation of collected items.
///
/// Repositories carry a numeric trend score built from stars, forks and how
/// recently they were updated. Papers and news have no score; they are
/// summarised by frequency counts and ordered by date.
pub mod frequency;
pub mod papers;
pub mod repository;

pub use frequency::FrequencyCounter;
pub use papers::{NewsAnalysis, PaperAnalysis, analyze_news, analyze_papers, latest_by};
pub use repository::{
    RECENCY_WINDOW_DAYS, RepoSignals, RepositoryAnalysis, STALE_DAYS, ScoredItem, analyze_repositories,
    days_since_update, rank_repositories, recency_score, repository_score, round2, score_repositories, scores_by,
};
