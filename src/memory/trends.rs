/// Trend store: the append-only record list of one agent.
///
/// Records keep insertion order and are never deduplicated. Reads sorted by
/// recency use the timestamp string directly; the canonical format is fixed
/// width and zero padded, so string order is time order.
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::ScoutResult;
use crate::filters::record_within_window;
use crate::memory::{load_or_init, trends_path, validate_agent_id};
use crate::persistence;
use crate::types::{TIMESTAMP_KEY, TrendRecord, TrendStoreData, format_timestamp, local_now};

/// Strict read of a trend document, without creating it.
///
/// Used by consolidation, which must see per-agent failures.
pub fn read_trends(path: &Path) -> ScoutResult<TrendStoreData> {
    persistence::load_json(path)
}

/// Stable newest-first sort by timestamp string.
pub(crate) fn sort_newest_first(records: &mut [TrendRecord]) {
    records.sort_by(|a, b| b.timestamp_key().cmp(a.timestamp_key()));
}

/// Persistent trend records for one agent.
#[derive(Debug)]
pub struct TrendStore {
    agent_id: String,
    path: PathBuf,
    data: TrendStoreData,
}

impl TrendStore {
    /// Open (and lazily create) the trend store of `agent_id` inside `dir`.
    pub fn open(dir: &Path, agent_id: &str) -> ScoutResult<Self> {
        validate_agent_id(agent_id)?;
        let path = trends_path(dir, agent_id);
        let data = load_or_init(&path, "trends", TrendStoreData::empty);
        debug!(agent_id, records = data.trends.len(), "opened trend store");

        Ok(Self {
            agent_id: agent_id.to_string(),
            path,
            data,
        })
    }

    /// Read the backing document from disk.
    ///
    /// Creates and persists an empty document when absent; returns an empty
    /// default (after logging) when the document cannot be read.
    pub fn load(&self) -> TrendStoreData {
        load_or_init(&self.path, "trends", TrendStoreData::empty)
    }

    /// Fallible variant of [`TrendStore::load`] that does not create the file.
    pub fn try_load(&self) -> ScoutResult<TrendStoreData> {
        read_trends(&self.path)
    }

    /// Replace the in-memory view with the current on-disk document.
    pub fn reload(&mut self) {
        self.data = self.load();
    }

    /// Append a record, stamping it with the current time if it has no
    /// `timestamp` field.
    pub fn add_trend(&mut self, record: TrendRecord) -> ScoutResult<()> {
        self.add_trend_at(record, &local_now())
    }

    /// Append a record using `now` as the clock reading.
    ///
    /// The store is persisted before the in-memory view changes; on failure
    /// both stay as they were.
    pub fn add_trend_at(&mut self, mut record: TrendRecord, now: &NaiveDateTime) -> ScoutResult<()> {
        let stamp = format_timestamp(now);
        if !record.has_timestamp() {
            record.insert(TIMESTAMP_KEY, stamp.clone());
        }

        let mut next = self.data.clone();
        next.trends.push(record);
        next.last_updated = stamp;

        persistence::save_json(&next, &self.path)?;
        self.data = next;
        debug!(agent_id = %self.agent_id, records = self.data.trends.len(), "trend added");
        Ok(())
    }

    /// The `n` most recent records, newest first. Ties keep insertion order.
    pub fn get_recent(&self, n: usize) -> Vec<TrendRecord> {
        let mut records = self.data.trends.clone();
        sort_newest_first(&mut records);
        records.truncate(n);
        records
    }

    /// Records inside the lookback window, newest first.
    ///
    /// Records with an unparsable timestamp are left out of the view but
    /// stay in the store.
    pub fn get_within(&self, lookback_days: u32, now: &NaiveDateTime) -> Vec<TrendRecord> {
        let mut records: Vec<TrendRecord> = self
            .data
            .trends
            .iter()
            .filter(|r| record_within_window(r, lookback_days, now))
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        records
    }

    /// Drop every record and persist the empty store.
    pub fn clear(&mut self) -> ScoutResult<()> {
        let next = TrendStoreData::empty();
        persistence::save_json(&next, &self.path)?;
        self.data = next;
        info!(agent_id = %self.agent_id, "trend store cleared");
        Ok(())
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order.
    pub fn trends(&self) -> &[TrendRecord] {
        &self.data.trends
    }

    pub fn last_updated(&self) -> &str {
        &self.data.last_updated
    }

    pub fn len(&self) -> usize {
        self.data.trends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.trends.is_empty()
    }
}
