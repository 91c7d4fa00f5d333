/// Cross-agent consolidation.
///
/// Merges every agent's trend store into a single newest-first report over a
/// lookback window. Agents are found by file name alone: each
/// `<agent_id>_trends.json` in the memory directory is one agent. Stores are
/// only read, never written, so consolidation can run next to live agents.
///
/// Failures never abort a run. An unreadable store is listed in
/// `skipped_agents`; an unreadable directory yields a report whose `error` is
/// set and whose `trends` list is empty.
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::error::{ScoutError, ScoutResult};
use crate::filters::record_within_window;
use crate::memory::trends::{read_trends, sort_newest_first};
use crate::memory::{TRENDS_SUFFIX, trends_path};
use crate::persistence;
use crate::types::{ConsolidatedReport, SkippedAgent, TrendRecord, format_timestamp, local_now};

/// Read-only view over all agent stores in one directory.
#[derive(Debug, Clone)]
pub struct TrendMemoryManager {
    dir: PathBuf,
}

impl TrendMemoryManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &ScoutConfig) -> Self {
        Self::new(config.memory_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Agent ids with a trend store in the directory, in name order.
    ///
    /// Context and chat files are ignored, as is a bare `_trends.json`.
    pub fn discover_agents(&self) -> ScoutResult<BTreeSet<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| ScoutError::io(&self.dir, e))?;

        let mut agents = BTreeSet::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %self.dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(agent_id) = name.to_str().and_then(|n| n.strip_suffix(TRENDS_SUFFIX)) else {
                continue;
            };
            if !agent_id.is_empty() && entry.path().is_file() {
                agents.insert(agent_id.to_string());
            }
        }

        debug!(dir = %self.dir.display(), agents = agents.len(), "discovered agents");
        Ok(agents)
    }

    /// Consolidate against the current local time.
    pub fn consolidate(&self, lookback_days: u32) -> ConsolidatedReport {
        self.consolidate_at(lookback_days, &local_now())
    }

    /// Merge every agent's records from the last `lookback_days` days.
    ///
    /// Each surviving record is tagged with its `agent_id`. The result is
    /// sorted newest first; equal timestamps keep agent order, then store
    /// order. `agent_count` is the number of agents discovered, including
    /// those that contributed nothing.
    pub fn consolidate_at(&self, lookback_days: u32, now: &NaiveDateTime) -> ConsolidatedReport {
        let consolidated_date = format_timestamp(now);

        let agents = match self.discover_agents() {
            Ok(agents) => agents,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "consolidation failed");
                return ConsolidatedReport::failed(consolidated_date, lookback_days, e.to_string());
            }
        };

        let mut trends: Vec<TrendRecord> = Vec::new();
        let mut skipped_agents = Vec::new();

        for agent_id in &agents {
            let data = match read_trends(&trends_path(&self.dir, agent_id)) {
                Ok(data) => data,
                Err(e) => {
                    warn!(agent_id, error = %e, "skipping unreadable trend store");
                    skipped_agents.push(SkippedAgent {
                        agent_id: agent_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let before = trends.len();
            trends.extend(
                data.trends
                    .into_iter()
                    .filter(|record| record_within_window(record, lookback_days, now))
                    .map(|record| record.with_agent_id(agent_id)),
            );
            debug!(agent_id, records = trends.len() - before, "collected agent trends");
        }

        sort_newest_first(&mut trends);

        info!(
            agents = agents.len(),
            trends = trends.len(),
            skipped = skipped_agents.len(),
            lookback_days,
            "consolidated trend memory"
        );

        ConsolidatedReport {
            consolidated_date,
            lookback_days,
            trend_count: trends.len(),
            agent_count: agents.len(),
            trends,
            skipped_agents,
            error: None,
        }
    }

    /// Consolidate and write the report to `path` as one JSON document.
    ///
    /// A report carrying a top-level `error` is still written, but the call
    /// then fails with `ScoutError::StorageUnavailable`.
    pub fn export(&self, path: &Path, lookback_days: u32) -> ScoutResult<()> {
        self.export_at(path, lookback_days, &local_now())
    }

    pub fn export_at(&self, path: &Path, lookback_days: u32, now: &NaiveDateTime) -> ScoutResult<()> {
        let report = self.consolidate_at(lookback_days, now);
        persistence::save_json(&report, path)?;

        if let Some(reason) = report.error {
            warn!(path = %path.display(), %reason, "exported a failed consolidation");
            return Err(ScoutError::StorageUnavailable {
                path: self.dir.clone(),
                reason,
            });
        }

        info!(
            path = %path.display(),
            trends = report.trend_count,
            "exported consolidated trends"
        );
        Ok(())
    }
}
