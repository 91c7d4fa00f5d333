/// Paper and news aggregation.
///
/// Papers and news items get no numeric score: they are ordered by their
/// date string, and the batch is summarised by author, category and source
/// frequencies.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ScoutError, ScoutResult};
use crate::scoring::frequency::FrequencyCounter;
use crate::sources::RawItem;

const TOP_AUTHORS: usize = 10;
const TOP_SOURCES: usize = 10;
const LATEST_ITEMS: usize = 5;

/// Aggregate view over a batch of papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAnalysis {
    pub total_papers: usize,
    pub top_authors: Vec<(String, usize)>,
    /// Every category, most frequent first
    pub top_categories: Vec<(String, usize)>,
    /// Papers per publication date, oldest date first
    pub publication_dates: Vec<(String, usize)>,
    pub latest_papers: Vec<RawItem>,
}

/// Aggregate view over a batch of news items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsAnalysis {
    pub total_news: usize,
    pub top_sources: Vec<(String, usize)>,
    pub publication_dates: Vec<(String, usize)>,
    pub latest_news: Vec<RawItem>,
}

/// The `n` items with the greatest `field` string, stable for ties.
/// Items without the field sort last.
pub fn latest_by(items: &[RawItem], field: &str, n: usize) -> Vec<RawItem> {
    let key = |item: &RawItem| -> String {
        item.get(field)
            .and_then(JsonValue::as_str)
            .unwrap_or("")
            .to_string()
    };
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| std::cmp::Reverse(key(item)));
    sorted.truncate(n);
    sorted
}

fn date_histogram(items: &[RawItem], field: &str) -> Vec<(String, usize)> {
    let mut dates: BTreeMap<String, usize> = BTreeMap::new();
    for date in items
        .iter()
        .filter_map(|item| item.get(field).and_then(JsonValue::as_str))
        .filter(|date| !date.is_empty())
    {
        *dates.entry(date.to_string()).or_default() += 1;
    }
    dates.into_iter().collect()
}

pub fn analyze_papers(papers: &[RawItem]) -> ScoutResult<PaperAnalysis> {
    if papers.is_empty() {
        return Err(ScoutError::EmptyBatch { what: "papers" });
    }

    let mut authors = FrequencyCounter::new();
    let mut categories = FrequencyCounter::new();
    for paper in papers {
        authors.add_strings(paper.get("authors"));
        categories.add_strings(paper.get("categories"));
    }

    Ok(PaperAnalysis {
        total_papers: papers.len(),
        top_authors: authors.top(TOP_AUTHORS),
        top_categories: categories.into_sorted(),
        publication_dates: date_histogram(papers, "published"),
        latest_papers: latest_by(papers, "published", LATEST_ITEMS),
    })
}

pub fn analyze_news(items: &[RawItem]) -> ScoutResult<NewsAnalysis> {
    if items.is_empty() {
        return Err(ScoutError::EmptyBatch { what: "news" });
    }

    let mut sources = FrequencyCounter::new();
    for item in items {
        if let Some(source) = item.get("source").and_then(JsonValue::as_str) {
            sources.add_nonempty(source);
        }
    }

    Ok(NewsAnalysis {
        total_news: items.len(),
        top_sources: sources.top(TOP_SOURCES),
        publication_dates: date_histogram(items, "date"),
        latest_news: latest_by(items, "date", LATEST_ITEMS),
    })
}
