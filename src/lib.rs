//! # Scout Edge: trend memory and scoring
//!
//! Scout Edge keeps what collection agents have seen. Agents gather papers,
//! repositories and news items from external sources; this crate stores them
//! per agent, scores them, and merges every agent's memory into one
//! time-windowed report.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scout_edge::prelude::*;
//!
//! fn main() -> ScoutResult<()> {
//!     let config = ScoutConfig::from_env();
//!
//!     // One agent remembers what it found
//!     let mut memory = AgentMemory::from_config(&config, "research_agent")?;
//!     memory.add_trend(TrendRecord::from_value(json!({
//!         "title": "Sparse mixture-of-experts at scale",
//!         "source": "arxiv"
//!     }))?)?;
//!
//!     // Any process can consolidate all agents afterwards
//!     let manager = TrendMemoryManager::from_config(&config);
//!     let report = manager.consolidate(7);
//!     println!("{} trends from {} agents", report.trend_count, report.agent_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! 1. **Memory** (`memory`) - per-agent trend, context and chat stores
//! 2. **Scoring** (`scoring`) - repository trend score and batch analyses
//! 3. **Collection** (`sources`) - adapter trait and the tag-splitting collector
//! 4. **Consolidation** (`consolidation`) - cross-agent merge and export
//!
//! Every store is a JSON document rewritten atomically on each mutation, so
//! a reader sees either the old file or the new one. All operations are
//! synchronous; one process should own each agent's files.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.

// Internal modules
mod error;
mod types;

pub mod config;
pub mod consolidation;
pub mod filters;
pub mod memory;
pub mod persistence;
pub mod report;
pub mod scoring;
pub mod sources;

// Public API exports
pub use config::{DefaultQueries, ScoutConfig};
pub use consolidation::TrendMemoryManager;
pub use error::{ScoutError, ScoutResult};
pub use memory::{AgentMemory, ChatHistory, ContextStore, TrendStore};
pub use types::{
    AGENT_ID_KEY, ChatLog, ChatMessage, ChatRole, ConsolidatedReport, ContextData, SkippedAgent, TIMESTAMP_FORMAT,
    TIMESTAMP_KEY, TrendRecord, TrendStoreData, format_timestamp, local_now, now_timestamp, parse_timestamp,
};

pub use report::{AnalysisKind, Summarizer, TrendReport, build_trend_report};
pub use scoring::{RepositoryAnalysis, ScoredItem, analyze_repositories, rank_repositories, repository_score};
pub use sources::{
    CollectQueries, CollectRequest, CollectedBatch, RawItem, SourceAdapter, SourceKind, TrendCollector, record_into,
};

// Re-export commonly used external types for convenience
pub use chrono::NaiveDateTime;
pub use serde_json::{Value as JsonValue, json};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use scout_edge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ScoutConfig;
    pub use crate::consolidation::TrendMemoryManager;
    pub use crate::error::{ScoutError, ScoutResult};
    pub use crate::memory::{AgentMemory, TrendStore};
    pub use crate::types::{ConsolidatedReport, TrendRecord};
    pub use chrono::NaiveDateTime;
    pub use serde_json::{Value as JsonValue, json};

    pub use crate::report::{AnalysisKind, Summarizer};
    pub use crate::sources::{CollectRequest, RawItem, SourceAdapter, SourceKind, TrendCollector};
}
