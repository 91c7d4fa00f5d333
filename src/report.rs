/// Trend reports over a collected batch.
///
/// Natural-language summarisation is an external concern reached through the
/// [`Summarizer`] trait. Without one, or when it fails to produce text, the
/// report falls back to a basic structural analysis.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::error::{ScoutError, ScoutResult};
use crate::sources::{CollectedBatch, SOURCE_KEY, SourceKind};
use crate::types::format_timestamp;

pub const REPORT_TITLE: &str = "Current AI Field Trend Analysis";

const BASIC_NOTE: &str = "This is a basic analysis result. A more comprehensive analysis requires a summarizer.";

/// Opaque text transformation, typically backed by a language model.
pub trait Summarizer {
    fn summarize(&self, prompt: &str) -> ScoutResult<String>;
}

/// Which angle a summarised analysis takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Brief,
    #[default]
    Comprehensive,
    Technical,
    Business,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Brief => "brief",
            AnalysisKind::Comprehensive => "comprehensive",
            AnalysisKind::Technical => "technical",
            AnalysisKind::Business => "business",
        }
    }

    /// Instruction text placed ahead of the data.
    pub fn instructions(&self) -> &'static str {
        match self {
            AnalysisKind::Brief => {
                "Briefly summarize current trends in the AI field (3-5 sentences). Highlight important points."
            }
            AnalysisKind::Technical => {
                "Analyze current trends in the AI field from a technical perspective. \
                 Focus on new technologies, algorithms, and methods."
            }
            AnalysisKind::Business => {
                "Analyze current trends in the AI field from a business perspective. \
                 Focus on commercial potential, investment opportunities, and market impacts."
            }
            AnalysisKind::Comprehensive => {
                "Comprehensively analyze current trends in the AI field.\n\n\
                 Please address the following topics:\n\
                 1. What are the major emerging trends?\n\
                 2. What are the rising technologies and approaches?\n\
                 3. What potential future impacts might these trends have?\n\
                 4. Which research areas or projects are particularly noteworthy?\n\
                 5. What recommendations can you offer to professionals and researchers in the AI field?\n\n\
                 Present the analysis in a clear, structured, and informative manner."
            }
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brief" => Ok(AnalysisKind::Brief),
            "comprehensive" => Ok(AnalysisKind::Comprehensive),
            "technical" => Ok(AnalysisKind::Technical),
            "business" => Ok(AnalysisKind::Business),
            other => Err(ScoutError::InvalidData {
                reason: format!("unknown analysis type '{other}'"),
            }),
        }
    }
}

/// Structural analysis produced without a summarizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicAnalysis {
    pub total_sources: usize,
    pub sources: Vec<String>,
    pub item_counts: BTreeMap<String, usize>,
    pub timestamp: String,
    pub analysis_note: String,
}

/// Summarizer output with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizedAnalysis {
    pub analysis: String,
    pub analysis_type: AnalysisKind,
    pub timestamp: String,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrendAnalysis {
    Summarized(SummarizedAnalysis),
    Basic(BasicAnalysis),
    Failed { error: String },
}

impl TrendAnalysis {
    pub fn is_summarized(&self) -> bool {
        matches!(self, TrendAnalysis::Summarized(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub report_date: String,
    pub report_title: String,
    pub analysis: TrendAnalysis,
    pub data_sources: Vec<String>,
    pub raw_data: CollectedBatch,
}

fn collection_key(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Arxiv => "arxiv_papers",
        SourceKind::GitHub => "github_repos",
        SourceKind::News => "news_articles",
    }
}

/// Distinct item sources and per-collection counts.
pub fn basic_analysis(batch: &CollectedBatch, now: &NaiveDateTime) -> BasicAnalysis {
    let mut sources = BTreeSet::new();
    let mut item_counts = BTreeMap::new();

    for kind in SourceKind::ALL {
        let items = batch.items(kind);
        item_counts.insert(collection_key(kind).to_string(), items.len());
        sources.extend(
            items
                .iter()
                .filter_map(|item| item.get(SOURCE_KEY).and_then(JsonValue::as_str))
                .map(str::to_string),
        );
    }

    BasicAnalysis {
        total_sources: sources.len(),
        sources: sources.into_iter().collect(),
        item_counts,
        timestamp: format_timestamp(now),
        analysis_note: BASIC_NOTE.to_string(),
    }
}

/// Instructions for `kind` followed by the batch as pretty JSON.
pub fn prepare_prompt(batch: &CollectedBatch, kind: AnalysisKind) -> ScoutResult<String> {
    let data = serde_json::to_string_pretty(batch)?;
    Ok(format!("{}\n\nHERE IS THE DATA TO ANALYZE:\n{}", kind.instructions(), data))
}

/// Analyse a batch, through the summarizer when one is given.
pub fn analyze(
    batch: &CollectedBatch,
    kind: AnalysisKind,
    summarizer: Option<&dyn Summarizer>,
    now: &NaiveDateTime,
) -> TrendAnalysis {
    let Some(summarizer) = summarizer else {
        return TrendAnalysis::Basic(basic_analysis(batch, now));
    };

    match prepare_prompt(batch, kind).and_then(|prompt| summarizer.summarize(&prompt)) {
        Ok(analysis) => {
            info!(%kind, "trend analysis completed");
            TrendAnalysis::Summarized(SummarizedAnalysis {
                analysis,
                analysis_type: kind,
                timestamp: format_timestamp(now),
                data_points: batch.total_items(),
            })
        }
        Err(e) => {
            error!(%kind, error = %e, "trend analysis failed");
            TrendAnalysis::Failed {
                error: format!("Error during trend analysis: {e}"),
            }
        }
    }
}

/// Combine a batch and its comprehensive analysis into one report.
pub fn build_trend_report(
    batch: CollectedBatch,
    summarizer: Option<&dyn Summarizer>,
    now: &NaiveDateTime,
) -> TrendReport {
    let analysis = analyze(&batch, AnalysisKind::Comprehensive, summarizer, now);
    TrendReport {
        report_date: now.format("%Y-%m-%d").to_string(),
        report_title: REPORT_TITLE.to_string(),
        analysis,
        data_sources: SourceKind::ALL.iter().map(|k| collection_key(*k).to_string()).collect(),
        raw_data: batch,
    }
}

/// A few sentences describing the report.
///
/// Uses the summarizer on a summarised analysis; anything else, including a
/// summarizer error, yields a fixed sentence naming the number of sources.
pub fn summary(report: &TrendReport, summarizer: Option<&dyn Summarizer>) -> String {
    if let (Some(summarizer), TrendAnalysis::Summarized(analysis)) = (summarizer, &report.analysis) {
        let prompt = format!(
            "Transform the following AI trend analysis report into a brief 3-5 sentence summary:\n\n{}\n\n\
             IMPORTANT: The summary should be brief, clear, and focused on the most important trends.",
            analysis.analysis
        );
        match summarizer.summarize(&prompt) {
            Ok(text) => return text,
            Err(e) => error!(error = %e, "summary failed, using fallback"),
        }
    }
    format!(
        "Analysis of recent AI trends based on data from {} different sources. See the full analysis for detailed report.",
        report.data_sources.len()
    )
}
