use chargeguard::history::{HistoryLog, HistorySink};
use std::fs;

#[test]
fn corrupt_history_file_starts_empty_and_recovers() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("history.json");
    fs::write(&path, "[{").unwrap();

    let mut log = HistoryLog::open(&path, 10);
    assert!(log.is_empty());
    log.append("after corruption", 42);

    let reopened = HistoryLog::open(&path, 10);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.entries()[0].message, "after corruption");
}

#[test]
fn mark_seen_persists() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("history.json");

    let mut log = HistoryLog::open(&path, 10);
    log.append("a", 1);
    log.append("b", 2);
    log.mark_all_seen();

    let reopened = HistoryLog::open(&path, 10);
    assert_eq!(reopened.unseen_count(), 0);
    assert_eq!(reopened.len(), 2);
}
