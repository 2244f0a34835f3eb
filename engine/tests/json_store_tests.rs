use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::{JsonFileStore, KeyValueStore};

fn unique_temp_json_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("cityquiz_engine_test_{tag}_{nanos}"))
        .join("store.json")
}

#[test]
fn values_survive_reopening_the_store() {
    let path = unique_temp_json_path("reopen");

    let mut store = JsonFileStore::open(&path);
    assert_eq!(store.get("map-guesser-difficulty"), None);
    store.set("map-guesser-difficulty", "hard");
    store.set("map-guesser-high-score-hard-10", "4");

    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.get("map-guesser-difficulty").as_deref(), Some("hard"));
    assert_eq!(
        reopened.get("map-guesser-high-score-hard-10").as_deref(),
        Some("4")
    );

    let _ = fs::remove_dir_all(path.parent().expect("store has a parent dir"));
}

#[test]
fn corrupt_file_opens_as_empty_store() {
    let path = unique_temp_json_path("corrupt");
    fs::create_dir_all(path.parent().expect("store has a parent dir")).expect("create temp dir");
    fs::write(&path, "not json at all").expect("write corrupt store");

    let mut store = JsonFileStore::open(&path);
    assert_eq!(store.get("anything"), None);

    // Writing replaces the corrupt contents.
    store.set("map-guesser-round-count", "15");
    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.get("map-guesser-round-count").as_deref(), Some("15"));

    let _ = fs::remove_dir_all(path.parent().expect("store has a parent dir"));
}

#[test]
fn persisted_file_is_a_flat_string_map() {
    let path = unique_temp_json_path("flat");
    let mut store = JsonFileStore::open(&path);
    store.set("a", "1");

    let text = fs::read_to_string(&path).expect("store file written");
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(parsed, serde_json::json!({ "a": "1" }));

    let _ = fs::remove_dir_all(path.parent().expect("store has a parent dir"));
}
