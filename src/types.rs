/// Common types used throughout Scout-Edge.
///
/// This module defines the persisted data model: trend records, the per-agent
/// trend/context/chat documents and the consolidated report. All timestamps
/// are plain local-clock strings in the fixed-width `YYYY-MM-DD HH:MM:SS`
/// format, so lexicographic order equals chronological order.
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{ScoutError, ScoutResult};

/// Canonical timestamp format used for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Payload key holding a record's timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Payload key injected by consolidation to mark provenance.
pub const AGENT_ID_KEY: &str = "agent_id";

/// Format a local date-time in the canonical timestamp format.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Current local time in the canonical timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(&local_now())
}

/// Parse a timestamp in the canonical format (no other formats accepted).
pub fn parse_timestamp(value: &str) -> ScoutResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        ScoutError::InvalidTimestamp {
            value: value.to_string(),
        }
    })
}

/// One persisted, timestamped observation.
///
/// The payload is an opaque JSON object; the store only cares about the
/// `timestamp` field. Serializes as the bare object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendRecord {
    fields: Map<String, JsonValue>,
}

impl TrendRecord {
    /// Create a record from an object payload.
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// Create a record from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: JsonValue) -> ScoutResult<Self> {
        match value {
            JsonValue::Object(fields) => Ok(Self { fields }),
            other => Err(ScoutError::InvalidData {
                reason: format!("trend record must be a JSON object, got {}", other),
            }),
        }
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Insert or overwrite a payload field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Whether the payload carries a `timestamp` field at all.
    pub fn has_timestamp(&self) -> bool {
        self.fields.contains_key(TIMESTAMP_KEY)
    }

    /// The record's timestamp, if present and a string.
    pub fn timestamp(&self) -> Option<&str> {
        self.fields.get(TIMESTAMP_KEY).and_then(JsonValue::as_str)
    }

    /// Sort key for recency ordering; records without a string timestamp
    /// sort as the empty string, i.e. oldest.
    pub fn timestamp_key(&self) -> &str {
        self.timestamp().unwrap_or("")
    }

    /// The originating agent, only present on consolidated records.
    pub fn agent_id(&self) -> Option<&str> {
        self.fields.get(AGENT_ID_KEY).and_then(JsonValue::as_str)
    }

    /// Tag the record with its originating agent.
    pub fn with_agent_id(mut self, agent_id: &str) -> Self {
        self.insert(AGENT_ID_KEY, agent_id);
        self
    }

    /// Borrow the whole payload.
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    /// Consume the record, returning the payload.
    pub fn into_fields(self) -> Map<String, JsonValue> {
        self.fields
    }
}

impl From<Map<String, JsonValue>> for TrendRecord {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self::new(fields)
    }
}

/// Persisted form of `<agent_id>_trends.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStoreData {
    /// Timestamp of the most recent mutation
    pub last_updated: String,
    /// Insertion-ordered, non-deduplicated records
    #[serde(default)]
    pub trends: Vec<TrendRecord>,
}

impl TrendStoreData {
    /// An empty store stamped with the current time.
    pub fn empty() -> Self {
        Self {
            last_updated: now_timestamp(),
            trends: Vec::new(),
        }
    }
}

/// Persisted form of `<agent_id>_context.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    /// Timestamp of the most recent mutation
    pub last_updated: String,
    /// Caller-defined preferences; survive `clear(keep_preferences = true)`
    #[serde(default)]
    pub user_preferences: Map<String, JsonValue>,
    /// Ephemeral per-session values; never survive a clear
    #[serde(default)]
    pub session_data: Map<String, JsonValue>,
}

impl ContextData {
    /// An empty context stamped with the current time.
    pub fn empty() -> Self {
        Self::with_preferences(Map::new())
    }

    /// A fresh context that keeps the given preferences.
    pub fn with_preferences(user_preferences: Map<String, JsonValue>) -> Self {
        Self {
            last_updated: now_timestamp(),
            user_preferences,
            session_data: Map::new(),
        }
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Ai,
}

impl ChatRole {
    /// Map a free-form role string; anything but "human" is the assistant.
    pub fn parse(role: &str) -> Self {
        if role.eq_ignore_ascii_case("human") {
            Self::Human
        } else {
            Self::Ai
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Persisted form of `<agent_id>_chat.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLog {
    pub last_updated: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn empty() -> Self {
        Self {
            last_updated: now_timestamp(),
            messages: Vec::new(),
        }
    }
}

/// An agent whose store could not be read during consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAgent {
    pub agent_id: String,
    pub reason: String,
}

/// Result of merging every agent's trend store over a lookback window.
///
/// Always well-formed: failures show up in `skipped_agents` or `error`
/// next to a (possibly empty) `trends` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// When the consolidation ran
    pub consolidated_date: String,
    /// Window used for filtering, in days
    pub lookback_days: u32,
    /// Always equals `trends.len()`
    pub trend_count: usize,
    /// Number of agents discovered, whether or not they contributed records
    pub agent_count: usize,
    /// Surviving records, newest first, each carrying `agent_id`
    pub trends: Vec<TrendRecord>,
    /// Agents whose stores were unreadable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_agents: Vec<SkippedAgent>,
    /// Top-level failure, if the storage location could not be scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConsolidatedReport {
    /// A report describing a top-level failure.
    pub fn failed(consolidated_date: String, lookback_days: u32, error: String) -> Self {
        Self {
            consolidated_date,
            lookback_days,
            trend_count: 0,
            agent_count: 0,
            trends: Vec::new(),
            skipped_agents: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether the report was produced without a top-level failure.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
