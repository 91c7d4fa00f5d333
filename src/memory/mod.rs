/// Per-agent persistent memory.
///
/// Each agent owns three independent JSON documents inside one storage
/// directory, keyed by the agent id:
///
/// ```text
/// <dir>/<agent_id>_trends.json   → TrendStore   (timestamped trend records)
/// <dir>/<agent_id>_context.json  → ContextStore (preferences + session data)
/// <dir>/<agent_id>_chat.json     → ChatHistory  (conversation turns)
/// ```
///
/// Every document is created lazily on first open and rewritten atomically
/// on every mutation. Reads fail soft: a missing or corrupt document yields
/// an empty default so the agent can keep working.
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::error::{ScoutError, ScoutResult};
use crate::persistence;

pub mod agent;
pub mod chat;
pub mod context;
pub mod trends;

pub use agent::AgentMemory;
pub use chat::ChatHistory;
pub use context::ContextStore;
pub use trends::TrendStore;

/// Filename suffix identifying a trend store; also the discovery convention.
pub const TRENDS_SUFFIX: &str = "_trends.json";
/// Filename suffix of a context store.
pub const CONTEXT_SUFFIX: &str = "_context.json";
/// Filename suffix of a chat history.
pub const CHAT_SUFFIX: &str = "_chat.json";

/// Path of the trend store for `agent_id` inside `dir`.
pub fn trends_path(dir: &Path, agent_id: &str) -> PathBuf {
    dir.join(format!("{agent_id}{TRENDS_SUFFIX}"))
}

/// Path of the context store for `agent_id` inside `dir`.
pub fn context_path(dir: &Path, agent_id: &str) -> PathBuf {
    dir.join(format!("{agent_id}{CONTEXT_SUFFIX}"))
}

/// Path of the chat history for `agent_id` inside `dir`.
pub fn chat_path(dir: &Path, agent_id: &str) -> PathBuf {
    dir.join(format!("{agent_id}{CHAT_SUFFIX}"))
}

/// Agent ids become filename prefixes, so they must be a single, non-empty
/// path component.
pub fn validate_agent_id(agent_id: &str) -> ScoutResult<()> {
    let bad = agent_id.is_empty()
        || agent_id == "."
        || agent_id == ".."
        || agent_id.contains(['/', '\\', '\0']);
    if bad {
        return Err(ScoutError::InvalidData {
            reason: format!("invalid agent id '{agent_id}'"),
        });
    }
    Ok(())
}

/// Read a store document, creating it with `init` when absent.
///
/// Never fails: an unreadable document is logged and replaced by `init()` in
/// memory only, leaving the file on disk untouched.
pub(crate) fn load_or_init<T, F>(path: &Path, kind: &'static str, init: F) -> T
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if !persistence::exists(path) {
        let fresh = init();
        if let Err(e) = persistence::save_json(&fresh, path) {
            warn!(kind, path = %path.display(), error = %e, "failed to initialize store");
        }
        return fresh;
    }

    match persistence::load_json(path) {
        Ok(data) => data,
        Err(e) => {
            error!(kind, path = %path.display(), error = %e, "failed to load store, using empty default");
            init()
        }
    }
}
