/// Repository scoring.
///
/// score = stars * 0.5 + forks * 0.3 + recency * 0.2 * 100, rounded to two
/// decimals, where recency decays linearly from 1.0 (updated today) to 0.0
/// (updated 30 or more days ago).
use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ScoutError, ScoutResult};
use crate::filters::{days_between, parse_item_date};
use crate::scoring::frequency::FrequencyCounter;
use crate::sources::RawItem;

/// Days over which the recency term decays to zero.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

/// Age assumed for repositories with a missing or unparsable update date.
pub const STALE_DAYS: i64 = 3650;

const STAR_WEIGHT: f64 = 0.5;
const FORK_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.2;
/// Lifts the [0, 1] recency term to star/fork magnitude.
const RECENCY_SCALE: f64 = 100.0;

const TOP_LANGUAGES: usize = 10;
const TOP_TOPICS: usize = 15;
const TOP_REPOSITORIES: usize = 10;

/// Popularity signals read from a repository item.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RepoSignals {
    pub stars: u64,
    pub forks: u64,
    pub updated_at: Option<NaiveDateTime>,
}

impl RepoSignals {
    /// Extract signals from a raw item. Missing or malformed counts read as
    /// zero, a missing or malformed `updated_at` as unknown.
    pub fn from_item(item: &RawItem) -> Self {
        Self {
            stars: count_field(item, "stars"),
            forks: count_field(item, "forks"),
            updated_at: item
                .get("updated_at")
                .and_then(JsonValue::as_str)
                .and_then(parse_item_date),
        }
    }
}

fn count_field(item: &RawItem, key: &str) -> u64 {
    match item.get(key) {
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Whole days since the last update, or [`STALE_DAYS`] when unknown.
pub fn days_since_update(updated_at: Option<&NaiveDateTime>, now: &NaiveDateTime) -> i64 {
    updated_at.map_or(STALE_DAYS, |at| days_between(at, now))
}

/// Linear recency decay in `[0, 1]`. Future dates count as today.
pub fn recency_score(days_since_update: i64) -> f64 {
    (RECENCY_WINDOW_DAYS - days_since_update).clamp(0, RECENCY_WINDOW_DAYS) as f64
        / RECENCY_WINDOW_DAYS as f64
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score one repository at reference time `now`.
pub fn repository_score(signals: &RepoSignals, now: &NaiveDateTime) -> f64 {
    let recency = recency_score(days_since_update(signals.updated_at.as_ref(), now));
    round2(
        signals.stars as f64 * STAR_WEIGHT
            + signals.forks as f64 * FORK_WEIGHT
            + recency * RECENCY_WEIGHT * RECENCY_SCALE,
    )
}

/// A source item with its derived score. Serializes as the item with an
/// extra `trend_score` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: RawItem,
    #[serde(rename = "trend_score")]
    pub score: f64,
}

impl ScoredItem {
    /// The item with `trend_score` written into it.
    pub fn into_item(self) -> RawItem {
        let mut item = self.item;
        item.insert("trend_score".to_string(), JsonValue::from(self.score));
        item
    }
}

/// Score every repository, keeping input order.
pub fn score_repositories(repos: &[RawItem], now: &NaiveDateTime) -> Vec<ScoredItem> {
    repos
        .iter()
        .map(|item| ScoredItem {
            score: repository_score(&RepoSignals::from_item(item), now),
            item: item.clone(),
        })
        .collect()
}

/// Score and sort descending. Equal scores keep input order.
pub fn rank_repositories(repos: &[RawItem], now: &NaiveDateTime) -> Vec<ScoredItem> {
    let mut scored = score_repositories(repos, now);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Aggregate view over a batch of repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub total_repos: usize,
    pub top_languages: Vec<(String, usize)>,
    pub top_topics: Vec<(String, usize)>,
    pub top_trending_repos: Vec<ScoredItem>,
}

/// Language and topic frequencies plus the best-scoring repositories.
pub fn analyze_repositories(repos: &[RawItem], now: &NaiveDateTime) -> ScoutResult<RepositoryAnalysis> {
    if repos.is_empty() {
        return Err(ScoutError::EmptyBatch { what: "repositories" });
    }

    let mut languages = FrequencyCounter::new();
    let mut topics = FrequencyCounter::new();
    for repo in repos {
        if let Some(language) = repo.get("language").and_then(JsonValue::as_str) {
            languages.add_nonempty(language);
        }
        topics.add_strings(repo.get("topics"));
    }

    let mut ranked = rank_repositories(repos, now);
    ranked.truncate(TOP_REPOSITORIES);

    Ok(RepositoryAnalysis {
        total_repos: repos.len(),
        top_languages: languages.top(TOP_LANGUAGES),
        top_topics: topics.top(TOP_TOPICS),
        top_trending_repos: ranked,
    })
}

/// Scores keyed by a repository field (typically `full_name`), for callers
/// that need lookups rather than a ranking.
pub fn scores_by(repos: &[RawItem], key: &str, now: &NaiveDateTime) -> HashMap<String, f64> {
    score_repositories(repos, now)
        .into_iter()
        .filter_map(|scored| {
            let name = scored.item.get(key)?.as_str()?.to_string();
            Some((name, scored.score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;
    use chrono::Duration;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        parse_timestamp("2025-06-30 12:00:00").unwrap()
    }

    fn repo(value: serde_json::Value) -> RawItem {
        value.as_object().cloned().unwrap()
    }

    fn updated(days_ago: i64) -> String {
        (now() - Duration::days(days_ago)).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    #[test]
    fn test_fresh_repository_score() {
        let item = repo(json!({"stars": 200, "forks": 50, "updated_at": updated(0)}));
        assert_eq!(repository_score(&RepoSignals::from_item(&item), &now()), 135.0);
    }

    #[test]
    fn test_stale_repository_score() {
        let item = repo(json!({"stars": 200, "forks": 50, "updated_at": updated(40)}));
        assert_eq!(repository_score(&RepoSignals::from_item(&item), &now()), 115.0);
    }

    #[test]
    fn test_partial_recency() {
        // 15 days old: recency 0.5 → 10 points
        let item = repo(json!({"stars": 0, "forks": 0, "updated_at": updated(15)}));
        assert_eq!(repository_score(&RepoSignals::from_item(&item), &now()), 10.0);
    }

    #[test]
    fn test_recency_score_bounds() {
        assert_eq!(recency_score(0), 1.0);
        assert_eq!(recency_score(-5), 1.0);
        assert_eq!(recency_score(30), 0.0);
        assert_eq!(recency_score(STALE_DAYS), 0.0);
        assert!((recency_score(10) - 20.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_item_defaults() {
        let item = repo(json!({"stars": "lots", "forks": -3, "updated_at": "someday"}));
        let signals = RepoSignals::from_item(&item);
        assert_eq!(signals, RepoSignals::default());
        assert_eq!(repository_score(&signals, &now()), 0.0);
    }

    #[test]
    fn test_date_only_updated_at() {
        let item = repo(json!({"stars": 10, "forks": 0, "updated_at": "2025-06-30"}));
        assert_eq!(repository_score(&RepoSignals::from_item(&item), &now()), 25.0);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let repos = vec![
            repo(json!({"name": "a", "stars": 10})),
            repo(json!({"name": "b", "stars": 30})),
            repo(json!({"name": "c", "stars": 10})),
        ];
        let names: Vec<_> = rank_repositories(&repos, &now())
            .into_iter()
            .map(|s| s.item["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_scored_item_serializes_trend_score() {
        let scored = ScoredItem {
            item: repo(json!({"name": "a"})),
            score: 12.5,
        };
        assert_eq!(
            serde_json::to_value(&scored).unwrap(),
            json!({"name": "a", "trend_score": 12.5})
        );
        assert_eq!(scored.into_item()["trend_score"], json!(12.5));
    }

    #[test]
    fn test_analyze_repositories() {
        let repos = vec![
            repo(json!({"full_name": "o/a", "stars": 10, "language": "Python", "topics": ["llm", "nlp"]})),
            repo(json!({"full_name": "o/b", "stars": 99, "language": "Rust", "topics": ["llm"]})),
            repo(json!({"full_name": "o/c", "stars": 5, "language": "Python"})),
        ];
        let analysis = analyze_repositories(&repos, &now()).unwrap();

        assert_eq!(analysis.total_repos, 3);
        assert_eq!(analysis.top_languages[0], ("Python".to_string(), 2));
        assert_eq!(analysis.top_topics, vec![("llm".to_string(), 2), ("nlp".to_string(), 1)]);
        assert_eq!(analysis.top_trending_repos[0].item["full_name"], "o/b");

        let by_name = scores_by(&repos, "full_name", &now());
        assert_eq!(by_name["o/b"], 49.5);
    }

    #[test]
    fn test_analyze_empty_batch() {
        assert!(matches!(
            analyze_repositories(&[], &now()),
            Err(ScoutError::EmptyBatch { what: "repositories" })
        ));
    }
}
