/// Context store: user preferences and session data of one agent.
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::error::ScoutResult;
use crate::memory::{context_path, load_or_init, validate_agent_id};
use crate::persistence;
use crate::types::{ContextData, now_timestamp};

/// Persistent free-form context for one agent.
#[derive(Debug)]
pub struct ContextStore {
    agent_id: String,
    path: PathBuf,
    data: ContextData,
}

impl ContextStore {
    /// Open (and lazily create) the context store of `agent_id` inside `dir`.
    pub fn open(dir: &Path, agent_id: &str) -> ScoutResult<Self> {
        validate_agent_id(agent_id)?;
        let path = context_path(dir, agent_id);
        let data = load_or_init(&path, "context", ContextData::empty);

        Ok(Self {
            agent_id: agent_id.to_string(),
            path,
            data,
        })
    }

    /// Read the backing document from disk, failing soft like the trend store.
    pub fn load(&self) -> ContextData {
        load_or_init(&self.path, "context", ContextData::empty)
    }

    /// Set a preference, overwriting any previous value for `key`.
    pub fn update_user_preference(&mut self, key: &str, value: JsonValue) -> ScoutResult<()> {
        let mut next = self.data.clone();
        next.user_preferences.insert(key.to_string(), value);
        self.commit(next)
    }

    /// Set a session value, overwriting any previous value for `key`.
    pub fn update_session_data(&mut self, key: &str, value: JsonValue) -> ScoutResult<()> {
        let mut next = self.data.clone();
        next.session_data.insert(key.to_string(), value);
        self.commit(next)
    }

    /// Reset the context. Session data is always dropped; preferences are
    /// kept only when `keep_preferences` is set.
    pub fn clear(&mut self, keep_preferences: bool) -> ScoutResult<()> {
        let preferences = if keep_preferences {
            self.data.user_preferences.clone()
        } else {
            Map::new()
        };
        let next = ContextData::with_preferences(preferences);
        persistence::save_json(&next, &self.path)?;
        self.data = next;
        info!(agent_id = %self.agent_id, keep_preferences, "context cleared");
        Ok(())
    }

    pub fn user_preferences(&self) -> &Map<String, JsonValue> {
        &self.data.user_preferences
    }

    pub fn session_data(&self) -> &Map<String, JsonValue> {
        &self.data.session_data
    }

    pub fn last_updated(&self) -> &str {
        &self.data.last_updated
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, mut next: ContextData) -> ScoutResult<()> {
        next.last_updated = now_timestamp();
        persistence::save_json(&next, &self.path)?;
        self.data = next;
        Ok(())
    }
}
