/// Integration tests for per-agent memory.
///
/// These exercise the stores through the public API against a real
/// temporary directory: lazy creation, persistence across reopen, fail-soft
/// reads and atomic writes.
use scout_edge::memory::{context_path, trends_path};
use scout_edge::{
    AgentMemory, ContextStore, ScoutError, TrendRecord, TrendStore, TrendStoreData, json, parse_timestamp,
    persistence,
};
use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;

fn record(value: serde_json::Value) -> TrendRecord {
    TrendRecord::from_value(value).unwrap()
}

#[test]
fn test_open_creates_empty_store() {
    let dir = tempdir().unwrap();
    let store = TrendStore::open(dir.path(), "alpha").unwrap();

    assert!(store.is_empty());
    let on_disk: TrendStoreData = persistence::load_json(&trends_path(dir.path(), "alpha")).unwrap();
    assert!(on_disk.trends.is_empty());
    assert!(parse_timestamp(&on_disk.last_updated).is_ok());
}

#[test]
fn test_add_trend_stamps_and_persists() {
    let dir = tempdir().unwrap();
    let now = parse_timestamp("2025-06-30 09:15:00").unwrap();

    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
    store.add_trend_at(record(json!({"title": "RAG"})), &now).unwrap();

    let reopened = TrendStore::open(dir.path(), "alpha").unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.trends()[0].timestamp(), Some("2025-06-30 09:15:00"));
    assert_eq!(reopened.last_updated(), "2025-06-30 09:15:00");
}

#[test]
fn test_existing_timestamp_is_kept() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();

    store
        .add_trend(record(json!({"title": "old", "timestamp": "2020-01-01 00:00:00"})))
        .unwrap();

    assert_eq!(store.trends()[0].timestamp(), Some("2020-01-01 00:00:00"));
}

#[test]
fn test_duplicates_are_kept() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
    let same = record(json!({"title": "same", "timestamp": "2025-06-01 00:00:00"}));

    store.add_trend(same.clone()).unwrap();
    store.add_trend(same).unwrap();

    assert_eq!(store.len(), 2);
}

#[test]
fn test_get_recent_orders_newest_first() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
    for (title, ts) in [
        ("b", "2025-06-02 00:00:00"),
        ("a", "2025-06-01 00:00:00"),
        ("c", "2025-06-03 00:00:00"),
        ("c2", "2025-06-03 00:00:00"),
    ] {
        store.add_trend(record(json!({"title": title, "timestamp": ts}))).unwrap();
    }

    let titles: Vec<_> = store
        .get_recent(3)
        .iter()
        .map(|r| r.get("title").unwrap().clone())
        .collect();
    assert_eq!(titles, vec![json!("c"), json!("c2"), json!("b")]);
    assert_eq!(store.get_recent(0).len(), 0);
    assert_eq!(store.get_recent(100).len(), 4);
}

#[test]
fn test_load_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
    store.add_trend(record(json!({"title": "x"}))).unwrap();

    assert_eq!(store.load(), store.load());
}

#[test]
fn test_corrupt_store_fails_soft_and_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let path = trends_path(dir.path(), "alpha");
    fs::write(&path, "{ definitely not json").unwrap();

    let store = TrendStore::open(dir.path(), "alpha").unwrap();
    assert!(store.is_empty());
    assert!(matches!(store.try_load(), Err(ScoutError::Serialization(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ definitely not json");
}

#[test]
fn test_failed_write_keeps_previous_state() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
    store.add_trend(record(json!({"title": "kept"}))).unwrap();
    let before = fs::read(store.path()).unwrap();

    // A directory where the temporary file should go makes the write fail
    fs::create_dir(store.path().with_extension("tmp")).unwrap();
    let result = store.add_trend(record(json!({"title": "lost"})));

    assert!(result.is_err());
    assert_eq!(store.len(), 1);
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_context_updates_persist() {
    let dir = tempdir().unwrap();
    let mut context = ContextStore::open(dir.path(), "alpha").unwrap();
    context.update_user_preference("topics", json!(["llm", "agents"])).unwrap();
    context.update_user_preference("topics", json!(["vision"])).unwrap();
    context.update_session_data("page", json!(3)).unwrap();

    let reopened = ContextStore::open(dir.path(), "alpha").unwrap();
    assert_eq!(reopened.user_preferences()["topics"], json!(["vision"]));
    assert_eq!(reopened.session_data()["page"], json!(3));
    assert!(context_path(dir.path(), "alpha").is_file());
}

#[test]
fn test_agent_memory_round_trip() {
    let dir = tempdir().unwrap();
    {
        let mut memory = AgentMemory::open(dir.path(), "research").unwrap();
        memory.add_trend(record(json!({"title": "paper"}))).unwrap();
        memory.add_message("human", "what is new?").unwrap();
        memory.add_message("ai", "mixture of experts").unwrap();
    }

    let memory = AgentMemory::open(dir.path(), "research").unwrap();
    assert_eq!(memory.get_recent_trends(5).len(), 1);
    assert_eq!(memory.chat_history().len(), 2);
    assert_eq!(memory.chat_history()[1].content, "mixture of experts");
}

#[test]
fn test_invalid_agent_ids_are_rejected() {
    let dir = tempdir().unwrap();
    for id in ["", "..", "a/b", "a\\b"] {
        assert!(
            matches!(TrendStore::open(dir.path(), id), Err(ScoutError::InvalidData { .. })),
            "{id:?} accepted"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_get_recent_is_sorted_prefix(days in proptest::collection::vec(1u32..28, 0..12), n in 0usize..15) {
        let dir = tempdir().unwrap();
        let mut store = TrendStore::open(dir.path(), "alpha").unwrap();
        for (i, day) in days.iter().enumerate() {
            let ts = format!("2025-06-{:02} 10:00:00", day);
            store.add_trend(record(json!({"i": i, "timestamp": ts}))).unwrap();
        }

        let recent = store.get_recent(n);
        prop_assert_eq!(recent.len(), n.min(days.len()));
        for pair in recent.windows(2) {
            prop_assert!(pair[0].timestamp_key() >= pair[1].timestamp_key());
        }
    }
}
