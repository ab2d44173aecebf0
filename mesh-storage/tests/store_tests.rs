//! Contract tests run against every `SnapshotStore` implementation.

use chrono::{Duration, Utc};
use mesh_crdt::{CrdtKind, GSet, PNCounter};
use mesh_storage::{MemoryStore, SnapshotStore, SqliteStore, StorageError, StoredSnapshot};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn snapshot(items: &[u32]) -> StoredSnapshot {
    let set = items.iter().fold(GSet::new("node1"), |s, i| s.add(*i));
    StoredSnapshot::capture(&set).unwrap()
}

async fn save_then_load(store: &dyn SnapshotStore) {
    let saved = snapshot(&[1, 2]);
    store.save("tags", saved.clone()).await.unwrap();
    let loaded = store.load("tags").await.unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.kind, CrdtKind::GSet);
    assert_eq!(loaded.version, 2);
}

async fn missing_key_is_none(store: &dyn SnapshotStore) {
    assert!(store.load("nope").await.unwrap().is_none());
}

async fn save_replaces(store: &dyn SnapshotStore) {
    store.save("k", snapshot(&[1])).await.unwrap();
    let newer = snapshot(&[1, 2, 3]);
    store.save("k", newer.clone()).await.unwrap();
    assert_eq!(store.load("k").await.unwrap(), Some(newer));
    assert_eq!(store.get_all_keys().await.unwrap(), vec!["k"]);
}

async fn keys_are_sorted(store: &dyn SnapshotStore) {
    for key in ["b", "c", "a"] {
        store.save(key, snapshot(&[])).await.unwrap();
    }
    assert_eq!(store.get_all_keys().await.unwrap(), vec!["a", "b", "c"]);
}

async fn delete_removes_and_tolerates_missing(store: &dyn SnapshotStore) {
    store.save("gone", snapshot(&[7])).await.unwrap();
    store.delete("gone").await.unwrap();
    store.delete("gone").await.unwrap();
    assert!(store.load("gone").await.unwrap().is_none());
    assert!(store.get_all_keys().await.unwrap().is_empty());
}

async fn empty_key_is_rejected(store: &dyn SnapshotStore) {
    let err = store.save("  ", snapshot(&[])).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

async fn any_node_id_round_trips(store: &dyn SnapshotStore) {
    let saved = StoredSnapshot::capture(&GSet::new("").add(1u32)).unwrap();
    store.save("anon", saved.clone()).await.unwrap();
    let loaded = store.load("anon").await.unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.decode::<GSet<u32>>().unwrap().node_id().as_str(), "");
}

async fn run_contract(make: impl Fn() -> Box<dyn SnapshotStore>) {
    save_then_load(make().as_ref()).await;
    missing_key_is_none(make().as_ref()).await;
    save_replaces(make().as_ref()).await;
    keys_are_sorted(make().as_ref()).await;
    delete_removes_and_tolerates_missing(make().as_ref()).await;
    empty_key_is_rejected(make().as_ref()).await;
    any_node_id_round_trips(make().as_ref()).await;
}

#[tokio::test]
async fn memory_store_contract() {
    run_contract(|| Box::new(MemoryStore::new()) as Box<dyn SnapshotStore>).await;
}

#[tokio::test]
async fn sqlite_store_contract() {
    run_contract(|| Box::new(SqliteStore::open_in_memory().unwrap()) as Box<dyn SnapshotStore>).await;
}

#[tokio::test]
async fn memory_store_len() {
    let store = MemoryStore::new();
    assert!(store.is_empty().await);
    store.save("a", snapshot(&[1])).await.unwrap();
    assert_eq!(store.len().await, 1);
}

// ── SQLite specifics ─────────────────────────────────────────────

#[tokio::test]
async fn sqlite_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshots.db");

    let counter = PNCounter::new("node1").increment(3);
    let saved = StoredSnapshot::capture(&counter).unwrap();
    {
        let store = SqliteStore::open(&path).unwrap();
        store.save("visits", saved.clone()).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.load("visits").await.unwrap().unwrap();
    assert_eq!(loaded.kind, CrdtKind::Counter);
    assert_eq!(loaded, saved);
    assert_eq!(loaded.decode::<PNCounter>().unwrap().value(), 3);
}

#[tokio::test]
async fn sqlite_queries_by_version() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save("small", snapshot(&[1])).await.unwrap();
    store.save("big", snapshot(&[1, 2, 3, 4])).await.unwrap();
    store.save("mid", snapshot(&[1, 2])).await.unwrap();

    assert_eq!(store.keys_above_version(1).unwrap(), vec!["mid", "big"]);
    assert!(store.keys_above_version(10).unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_queries_by_save_time() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Utc::now();

    let mut old = snapshot(&[1]);
    old.saved_at = now - Duration::hours(2);
    let mut recent = snapshot(&[2]);
    recent.saved_at = now - Duration::minutes(5);
    store.save("old", old).await.unwrap();
    store.save("recent", recent).await.unwrap();

    let since = now - Duration::hours(1);
    assert_eq!(store.keys_saved_since(since).unwrap(), vec!["recent"]);
    assert_eq!(
        store.keys_saved_since(now - Duration::days(1)).unwrap(),
        vec!["old", "recent"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_handles_concurrent_writers() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let tasks: Vec<_> = (0..16u32)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.save(&format!("k{i:02}"), snapshot(&[i])).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let keys = store.get_all_keys().await.unwrap();
    assert_eq!(keys.len(), 16);
    assert_eq!(keys.first().map(String::as_str), Some("k00"));
}
