/// Collection sources and the collector that drives them.
///
/// Network-facing adapters live outside this crate. Each one implements
/// [`SourceAdapter`] for exactly one [`SourceKind`]; the collector picks the
/// adapter by kind, splits the result budget across the configured tags,
/// applies the time window and hands the surviving items to a trend store.
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::error::{ScoutError, ScoutResult};
use crate::filters::{per_tag_cap, retain_within_window};
use crate::memory::TrendStore;
use crate::types::TrendRecord;

/// A raw item as returned by a source adapter.
pub type RawItem = Map<String, JsonValue>;

/// Payload key naming the source an item came from.
pub const SOURCE_KEY: &str = "source";

/// The closed set of collection sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "arxiv")]
    Arxiv,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "news")]
    News,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Arxiv, SourceKind::GitHub, SourceKind::News];

    /// Stable lowercase name, also written into each item's `source` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Arxiv => "arxiv",
            SourceKind::GitHub => "github",
            SourceKind::News => "news",
        }
    }

    /// The item field holding the date used by the collection window.
    pub fn date_field(&self) -> &'static str {
        match self {
            SourceKind::Arxiv => "published",
            SourceKind::GitHub => "created_at",
            SourceKind::News => "date",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query issued to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub query: String,
    pub max_results: usize,
    pub window_days: u32,
    /// Repository sources only
    pub min_stars: Option<u64>,
    /// Restrict the query to these categories/tags (empty = unrestricted)
    pub categories: Vec<String>,
}

/// Capability shared by every source adapter.
pub trait SourceAdapter: Send + Sync {
    /// The source this adapter serves.
    fn kind(&self) -> SourceKind;

    /// Run one query. Implementations should honour `max_results`; the
    /// collector truncates anyway.
    fn collect(&self, request: &CollectRequest) -> ScoutResult<Vec<RawItem>>;
}

/// Items gathered for one source across its tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedCollection {
    pub items: Vec<RawItem>,
    /// Per-tag failures that were skipped
    pub failures: Vec<String>,
}

/// Per-source queries for a combined collection run. `None` skips a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectQueries {
    pub arxiv: Option<String>,
    pub github: Option<String>,
    pub news: Option<String>,
}

impl CollectQueries {
    /// Every source, each with its configured default query.
    pub fn defaults(config: &ScoutConfig) -> Self {
        let q = &config.default_queries;
        Self {
            arxiv: Some(q.arxiv.clone()),
            github: Some(q.github.clone()),
            news: Some(q.news.clone()),
        }
    }

    fn get(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Arxiv => self.arxiv.as_deref(),
            SourceKind::GitHub => self.github.as_deref(),
            SourceKind::News => self.news.as_deref(),
        }
    }
}

/// Result of a combined collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedBatch {
    #[serde(rename = "arxiv_papers")]
    pub papers: Vec<RawItem>,
    #[serde(rename = "github_repos")]
    pub repositories: Vec<RawItem>,
    #[serde(rename = "news_articles")]
    pub news: Vec<RawItem>,
    pub errors: Vec<String>,
}

impl CollectedBatch {
    pub fn items(&self, kind: SourceKind) -> &[RawItem] {
        match kind {
            SourceKind::Arxiv => &self.papers,
            SourceKind::GitHub => &self.repositories,
            SourceKind::News => &self.news,
        }
    }

    fn items_mut(&mut self, kind: SourceKind) -> &mut Vec<RawItem> {
        match kind {
            SourceKind::Arxiv => &mut self.papers,
            SourceKind::GitHub => &mut self.repositories,
            SourceKind::News => &mut self.news,
        }
    }

    pub fn total_items(&self) -> usize {
        self.papers.len() + self.repositories.len() + self.news.len()
    }
}

/// Drives registered adapters and feeds trend stores.
pub struct TrendCollector {
    config: ScoutConfig,
    adapters: HashMap<SourceKind, Box<dyn SourceAdapter>>,
}

impl TrendCollector {
    pub fn new(config: ScoutConfig) -> Self {
        Self {
            config,
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter under its own kind, returning the one it replaces.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) -> Option<Box<dyn SourceAdapter>> {
        self.adapters.insert(adapter.kind(), adapter)
    }

    pub fn has_source(&self, kind: SourceKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    fn adapter(&self, kind: SourceKind) -> ScoutResult<&dyn SourceAdapter> {
        self.adapters
            .get(&kind)
            .map(|adapter| adapter.as_ref())
            .ok_or(ScoutError::SourceNotRegistered { kind })
    }

    /// Collect from one source with the budget split evenly over `tags`.
    ///
    /// Each tag gets `floor(max_total / tags.len())` results; with no tags a
    /// single unrestricted query under the source's default query gets the
    /// whole budget. A failing tag is recorded and skipped. The combined
    /// items are then narrowed to the `window_days` lookback.
    pub fn collect_tagged(
        &self,
        kind: SourceKind,
        tags: &[String],
        max_total: usize,
        window_days: u32,
        now: &NaiveDateTime,
    ) -> ScoutResult<TaggedCollection> {
        let adapter = self.adapter(kind)?;
        let cap = per_tag_cap(max_total, tags.len());

        let mut collection = TaggedCollection::default();
        if cap == 0 {
            debug!(%kind, max_total, tags = tags.len(), "per-tag cap is zero, nothing to collect");
            return Ok(collection);
        }

        let requests: Vec<CollectRequest> = if tags.is_empty() {
            vec![self.request(kind, self.config.default_queries.query_for(kind), cap, window_days, vec![])]
        } else {
            tags.iter()
                .map(|tag| self.request(kind, tag, cap, window_days, vec![tag.clone()]))
                .collect()
        };

        for request in &requests {
            match adapter.collect(request) {
                Ok(mut items) => {
                    items.truncate(request.max_results);
                    collection.items.extend(items.into_iter().map(|item| tag_source(item, kind)));
                }
                Err(e) => {
                    warn!(%kind, query = %request.query, error = %e, "skipping failed query");
                    collection.failures.push(format!("{} query '{}' failed: {}", kind, request.query, e));
                }
            }
        }

        collection.items = retain_within_window(collection.items, kind.date_field(), window_days, now);
        info!(%kind, items = collection.items.len(), failures = collection.failures.len(), "collection finished");
        Ok(collection)
    }

    /// Collect from one source using the configured tags, cap and lookback.
    pub fn collect_configured(&self, kind: SourceKind, now: &NaiveDateTime) -> ScoutResult<TaggedCollection> {
        self.collect_tagged(
            kind,
            self.config.tags_for(kind),
            self.config.max_results_for(kind),
            self.config.default_lookback_days,
            now,
        )
    }

    /// Run one query per requested source.
    ///
    /// Missing adapters and failing sources are reported in `errors`; the
    /// other sources still contribute.
    pub fn collect_all(
        &self,
        queries: &CollectQueries,
        max_results: Option<usize>,
        now: &NaiveDateTime,
    ) -> CollectedBatch {
        let window = self.config.default_lookback_days;
        let mut batch = CollectedBatch::default();

        for kind in SourceKind::ALL {
            let Some(query) = queries.get(kind) else {
                continue;
            };
            let max = max_results.unwrap_or_else(|| self.config.max_results_for(kind));
            let request = self.request(kind, query, max, window, vec![]);

            let outcome = self
                .adapter(kind)
                .and_then(|adapter| adapter.collect(&request));
            match outcome {
                Ok(mut items) => {
                    items.truncate(max);
                    let items = items.into_iter().map(|item| tag_source(item, kind)).collect();
                    *batch.items_mut(kind) = retain_within_window(items, kind.date_field(), window, now);
                }
                Err(e) => {
                    warn!(%kind, error = %e, "source unavailable");
                    batch.errors.push(format!("{} search failed: {}", kind, e));
                }
            }
        }

        info!(
            papers = batch.papers.len(),
            repositories = batch.repositories.len(),
            news = batch.news.len(),
            errors = batch.errors.len(),
            "collection run finished"
        );
        batch
    }

    fn request(
        &self,
        kind: SourceKind,
        query: &str,
        max_results: usize,
        window_days: u32,
        categories: Vec<String>,
    ) -> CollectRequest {
        CollectRequest {
            query: query.to_string(),
            max_results,
            window_days,
            min_stars: (kind == SourceKind::GitHub).then_some(self.config.github_min_stars),
            categories,
        }
    }
}

/// Append collected items to a trend store, each as one record tagged with
/// its source. Returns how many records were written; stops at the first
/// persistence failure.
pub fn record_into(store: &mut TrendStore, kind: SourceKind, items: Vec<RawItem>) -> ScoutResult<usize> {
    let mut written = 0;
    for item in items {
        store.add_trend(TrendRecord::new(tag_source(item, kind)))?;
        written += 1;
    }
    Ok(written)
}

fn tag_source(mut item: RawItem, kind: SourceKind) -> RawItem {
    item.entry(SOURCE_KEY)
        .or_insert_with(|| JsonValue::from(kind.as_str()));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Returns `per_query` dated items per request and remembers requests.
    struct FakeSource {
        kind: SourceKind,
        per_query: usize,
        fail_on: Option<String>,
        seen: Mutex<Vec<CollectRequest>>,
    }

    impl FakeSource {
        fn new(kind: SourceKind, per_query: usize) -> Self {
            Self {
                kind,
                per_query,
                fail_on: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl SourceAdapter for FakeSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn collect(&self, request: &CollectRequest) -> ScoutResult<Vec<RawItem>> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail_on.as_deref() == Some(request.query.as_str()) {
                return Err(ScoutError::Source {
                    kind: self.kind,
                    reason: "rate limited".into(),
                });
            }
            Ok((0..self.per_query)
                .map(|i| {
                    let mut item = RawItem::new();
                    item.insert("id".into(), json!(format!("{}-{}", request.query, i)));
                    item.insert(self.kind.date_field().into(), json!("2025-06-28"));
                    item
                })
                .collect())
        }
    }

    fn now() -> NaiveDateTime {
        parse_timestamp("2025-06-30 12:00:00").unwrap()
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_even_split_across_tags() {
        let mut collector = TrendCollector::new(ScoutConfig::default());
        collector.register(Box::new(FakeSource::new(SourceKind::GitHub, 50)));

        let result = collector
            .collect_tagged(SourceKind::GitHub, &tags(&["llm", "nlp", "vision"]), 10, 30, &now())
            .unwrap();

        // floor(10 / 3) = 3 per tag
        assert_eq!(result.items.len(), 9);
        assert!(result.items.iter().all(|i| i[SOURCE_KEY] == "github"));
    }

    #[test]
    fn test_no_tags_uses_full_budget_and_default_query() {
        let source = FakeSource::new(SourceKind::Arxiv, 50);
        let mut collector = TrendCollector::new(ScoutConfig::default());
        collector.register(Box::new(source));

        let result = collector
            .collect_tagged(SourceKind::Arxiv, &[], 12, 30, &now())
            .unwrap();
        assert_eq!(result.items.len(), 12);
        assert_eq!(result.items[0]["id"], "artificial intelligence-0");
    }

    #[test]
    fn test_failed_tag_is_skipped() {
        let mut source = FakeSource::new(SourceKind::GitHub, 2);
        source.fail_on = Some("nlp".into());
        let mut collector = TrendCollector::new(ScoutConfig::default());
        collector.register(Box::new(source));

        let result = collector
            .collect_tagged(SourceKind::GitHub, &tags(&["llm", "nlp"]), 4, 30, &now())
            .unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.failures.len(), 1);
    }

    #[test]
    fn test_window_applies_to_collected_items() {
        let mut collector = TrendCollector::new(ScoutConfig::default());
        collector.register(Box::new(FakeSource::new(SourceKind::Arxiv, 3)));

        // Items are dated 2025-06-28; a 1-day window excludes them
        let result = collector
            .collect_tagged(SourceKind::Arxiv, &tags(&["cs.AI"]), 3, 1, &now())
            .unwrap();
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_unregistered_source() {
        let collector = TrendCollector::new(ScoutConfig::default());
        let result = collector.collect_tagged(SourceKind::News, &[], 5, 30, &now());
        assert!(matches!(result, Err(ScoutError::SourceNotRegistered { kind: SourceKind::News })));
    }

    #[test]
    fn test_collect_all_reports_missing_sources() {
        let mut collector = TrendCollector::new(ScoutConfig::default());
        collector.register(Box::new(FakeSource::new(SourceKind::Arxiv, 2)));

        let batch = collector.collect_all(&CollectQueries::defaults(collector.config()), None, &now());
        assert_eq!(batch.papers.len(), 2);
        assert!(batch.repositories.is_empty());
        assert_eq!(batch.errors.len(), 2);
    }

    #[test]
    fn test_record_into_tags_source() {
        let dir = tempdir().unwrap();
        let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
        let item = json!({"title": "paper"}).as_object().cloned().unwrap();

        let written = record_into(&mut store, SourceKind::Arxiv, vec![item]).unwrap();

        assert_eq!(written, 1);
        assert_eq!(store.trends()[0].get(SOURCE_KEY), Some(&json!("arxiv")));
        assert!(store.trends()[0].timestamp().is_some());
    }
}
