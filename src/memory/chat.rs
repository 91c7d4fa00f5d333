/// Chat history: the conversation turns of one agent.
use std::path::{Path, PathBuf};

use crate::error::ScoutResult;
use crate::memory::{chat_path, load_or_init, validate_agent_id};
use crate::persistence;
use crate::types::{ChatLog, ChatMessage, ChatRole, now_timestamp};

#[derive(Debug)]
pub struct ChatHistory {
    path: PathBuf,
    log: ChatLog,
}

impl ChatHistory {
    pub fn open(dir: &Path, agent_id: &str) -> ScoutResult<Self> {
        validate_agent_id(agent_id)?;
        let path = chat_path(dir, agent_id);
        let log = load_or_init(&path, "chat", ChatLog::empty);
        Ok(Self { path, log })
    }

    /// Append a turn. `role` is free-form: "human" (any case) is the user,
    /// everything else is the assistant.
    pub fn add_message(&mut self, role: &str, content: &str) -> ScoutResult<()> {
        let mut next = self.log.clone();
        next.messages.push(ChatMessage {
            role: ChatRole::parse(role),
            content: content.to_string(),
        });
        next.last_updated = now_timestamp();

        persistence::save_json(&next, &self.path)?;
        self.log = next;
        Ok(())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.log.messages
    }

    pub fn clear(&mut self) -> ScoutResult<()> {
        let next = ChatLog::empty();
        persistence::save_json(&next, &self.path)?;
        self.log = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_messages_persist_in_order() {
        let dir = tempdir().unwrap();
        let mut chat = ChatHistory::open(dir.path(), "alpha").unwrap();
        chat.add_message("Human", "what's new in vision?").unwrap();
        chat.add_message("assistant", "three new papers").unwrap();

        let reopened = ChatHistory::open(dir.path(), "alpha").unwrap();
        let roles: Vec<_> = reopened.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Human, ChatRole::Ai]);
        assert_eq!(reopened.messages()[1].content, "three new papers");
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let mut chat = ChatHistory::open(dir.path(), "alpha").unwrap();
        chat.add_message("human", "hi").unwrap();
        chat.clear().unwrap();

        assert!(ChatHistory::open(dir.path(), "alpha").unwrap().messages().is_empty());
    }
}
