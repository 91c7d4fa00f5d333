/// Configuration for Scout-Edge components.
///
/// There is no global configuration: build a `ScoutConfig` once (from
/// defaults, the environment or a JSON file) and hand it, or the pieces it
/// resolves to, to each component's constructor.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ScoutError, ScoutResult};
use crate::persistence;
use crate::sources::SourceKind;

/// Default search queries per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultQueries {
    pub arxiv: String,
    pub github: String,
    pub news: String,
}

impl Default for DefaultQueries {
    fn default() -> Self {
        Self {
            arxiv: "artificial intelligence".to_string(),
            github: "machine learning".to_string(),
            news: "AI trends".to_string(),
        }
    }
}

impl DefaultQueries {
    /// The default query for a source.
    pub fn query_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Arxiv => &self.arxiv,
            SourceKind::GitHub => &self.github,
            SourceKind::News => &self.news,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Root data directory; agent stores live under `<data_dir>/memory`
    pub data_dir: PathBuf,
    /// Result cap for a paper collection run
    pub arxiv_max_results: usize,
    /// Result cap for a repository collection run
    pub github_max_results: usize,
    /// Minimum stars for repository collection
    pub github_min_stars: u64,
    /// Paper categories driving collection
    pub arxiv_categories: Vec<String>,
    /// Repository topics driving collection
    pub github_tags: Vec<String>,
    /// Fallback query per source
    pub default_queries: DefaultQueries,
    /// Lookback window used when none is given
    pub default_lookback_days: u32,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            arxiv_max_results: 10,
            github_max_results: 10,
            github_min_stars: 100,
            arxiv_categories: ["cs.AI", "cs.CL", "cs.CV", "cs.LG", "cs.NE", "stat.ML"]
                .into_iter()
                .map(String::from)
                .collect(),
            github_tags: [
                "artificial-intelligence",
                "machine-learning",
                "deep-learning",
                "nlp",
                "computer-vision",
                "neural-network",
                "llm",
                "transformer",
                "generative-ai",
                "diffusion-model",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_queries: DefaultQueries::default(),
            default_lookback_days: 30,
        }
    }
}

impl ScoutConfig {
    /// Defaults overlaid with `DATA_DIR`, `ARXIV_MAX_RESULTS` and
    /// `GITHUB_MAX_RESULTS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`ScoutConfig::from_env`] but reading variables through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(n) = parse_count(&lookup, "ARXIV_MAX_RESULTS") {
            config.arxiv_max_results = n;
        }
        if let Some(n) = parse_count(&lookup, "GITHUB_MAX_RESULTS") {
            config.github_max_results = n;
        }

        config
    }

    /// Load a JSON configuration file; missing fields take their defaults.
    pub fn load(path: &Path) -> ScoutResult<Self> {
        let config: Self = persistence::load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no component can work with.
    pub fn validate(&self) -> ScoutResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ScoutError::InvalidData {
                reason: "data_dir must not be empty".to_string(),
            });
        }
        if self.arxiv_max_results == 0 || self.github_max_results == 0 {
            return Err(ScoutError::InvalidData {
                reason: "result caps must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Directory holding the per-agent store files.
    pub fn memory_dir(&self) -> PathBuf {
        self.data_dir.join("memory")
    }

    /// Result cap configured for a source. News has no cap of its own and
    /// shares the paper cap.
    pub fn max_results_for(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::GitHub => self.github_max_results,
            SourceKind::Arxiv | SourceKind::News => self.arxiv_max_results,
        }
    }

    /// Tags driving collection for a source.
    pub fn tags_for(&self, kind: SourceKind) -> &[String] {
        match kind {
            SourceKind::Arxiv => &self.arxiv_categories,
            SourceKind::GitHub => &self.github_tags,
            SourceKind::News => &[],
        }
    }
}

fn parse_count<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable numeric setting");
            None
        }
    }
}
