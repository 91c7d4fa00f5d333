/// Agent memory: the three stores one agent owns, opened together.
///
/// This is the handle a collection agent keeps for its whole lifetime. It is
/// the single writer of its own files; consolidation only ever reads them.
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::config::ScoutConfig;
use crate::error::{ScoutError, ScoutResult};
use crate::memory::{ChatHistory, ContextStore, TrendStore, validate_agent_id};
use crate::types::{ChatMessage, TrendRecord};

#[derive(Debug)]
pub struct AgentMemory {
    agent_id: String,
    dir: PathBuf,
    trends: TrendStore,
    context: ContextStore,
    chat: ChatHistory,
}

impl AgentMemory {
    /// Open every store of `agent_id` under `dir`, creating what is missing.
    ///
    /// # Errors
    ///
    /// - `ScoutError::InvalidData` for an agent id that is not a plain name
    /// - `ScoutError::StorageUnavailable` if `dir` cannot be created
    pub fn open(dir: &Path, agent_id: &str) -> ScoutResult<Self> {
        validate_agent_id(agent_id)?;
        fs::create_dir_all(dir).map_err(|e| ScoutError::StorageUnavailable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let memory = Self {
            agent_id: agent_id.to_string(),
            dir: dir.to_path_buf(),
            trends: TrendStore::open(dir, agent_id)?,
            context: ContextStore::open(dir, agent_id)?,
            chat: ChatHistory::open(dir, agent_id)?,
        };
        info!(agent_id, dir = %dir.display(), "initialized agent memory");
        Ok(memory)
    }

    /// Open the agent's stores in the configured memory directory.
    pub fn from_config(config: &ScoutConfig, agent_id: &str) -> ScoutResult<Self> {
        Self::open(&config.memory_dir(), agent_id)
    }

    pub fn add_trend(&mut self, record: TrendRecord) -> ScoutResult<()> {
        self.trends.add_trend(record)
    }

    pub fn get_recent_trends(&self, n: usize) -> Vec<TrendRecord> {
        self.trends.get_recent(n)
    }

    pub fn update_user_preference(&mut self, key: &str, value: JsonValue) -> ScoutResult<()> {
        self.context.update_user_preference(key, value)
    }

    pub fn update_session_data(&mut self, key: &str, value: JsonValue) -> ScoutResult<()> {
        self.context.update_session_data(key, value)
    }

    pub fn user_preferences(&self) -> &Map<String, JsonValue> {
        self.context.user_preferences()
    }

    pub fn add_message(&mut self, role: &str, content: &str) -> ScoutResult<()> {
        self.chat.add_message(role, content)
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    /// Empty the chat history, the trend records and the session data.
    /// User preferences survive when `keep_preferences` is set.
    pub fn clear_memory(&mut self, keep_preferences: bool) -> ScoutResult<()> {
        self.chat.clear()?;
        self.trends.clear()?;
        self.context.clear(keep_preferences)?;
        info!(agent_id = %self.agent_id, keep_preferences, "memory cleared");
        Ok(())
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trends(&self) -> &TrendStore {
        &self.trends
    }

    pub fn trends_mut(&mut self) -> &mut TrendStore {
        &mut self.trends
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn seeded(dir: &Path) -> AgentMemory {
        let mut memory = AgentMemory::open(dir, "alpha").unwrap();
        memory
            .add_trend(TrendRecord::from_value(json!({"title": "agents"})).unwrap())
            .unwrap();
        memory.update_user_preference("focus", json!("nlp")).unwrap();
        memory.update_session_data("cursor", json!(7)).unwrap();
        memory.add_message("human", "hello").unwrap();
        memory
    }

    #[test]
    fn test_open_creates_all_three_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("memory");
        AgentMemory::open(&root, "alpha").unwrap();

        for name in ["alpha_trends.json", "alpha_context.json", "alpha_chat.json"] {
            assert!(root.join(name).is_file(), "{name} missing");
        }
    }

    #[test]
    fn test_clear_memory_keeps_preferences() {
        let dir = tempdir().unwrap();
        let mut memory = seeded(dir.path());

        memory.clear_memory(true).unwrap();

        let reopened = AgentMemory::open(dir.path(), "alpha").unwrap();
        assert!(reopened.trends().is_empty());
        assert!(reopened.chat_history().is_empty());
        assert!(reopened.context().session_data().is_empty());
        assert_eq!(reopened.user_preferences()["focus"], json!("nlp"));
    }

    #[test]
    fn test_clear_memory_drops_everything() {
        let dir = tempdir().unwrap();
        let mut memory = seeded(dir.path());

        memory.clear_memory(false).unwrap();

        let reopened = AgentMemory::open(dir.path(), "alpha").unwrap();
        assert!(reopened.trends().is_empty());
        assert!(reopened.user_preferences().is_empty());
        assert!(reopened.context().session_data().is_empty());
    }
}
