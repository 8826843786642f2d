//! Bounded event history
//!
//! Keeps the most recent event and protection messages, oldest evicted
//! first, with a per-entry seen flag so a UI can show an unread count.

use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Destination for history records
pub trait HistorySink {
    fn append(&mut self, message: &str, timestamp_ms: u64);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Control-loop clock at the time of the event
    pub timestamp_ms: u64,
    /// Wall-clock time, RFC 3339
    pub recorded_at: String,
    pub message: String,
    #[serde(default)]
    pub seen: bool,
}

pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    file_path: Option<PathBuf>,
    logger: StructuredLogger,
}

impl HistoryLog {
    /// History that lives only in memory
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            file_path: None,
            logger: get_logger("history"),
        }
    }

    /// History backed by a JSON file, loading what is already there
    pub fn open<P: AsRef<Path>>(file_path: P, capacity: usize) -> Self {
        let mut log = Self::in_memory(capacity);
        let path = file_path.as_ref().to_path_buf();
        match Self::load(&path) {
            Ok(entries) => {
                log.entries = entries.into();
                log.trim();
            }
            Err(e) => log.logger.warn(&format!(
                "Ignoring unreadable history file {}: {}",
                path.display(),
                e
            )),
        }
        log.file_path = Some(path);
        log
    }

    fn load(path: &Path) -> Result<Vec<HistoryEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(&self.entries)?)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            self.logger.warn(&format!("Failed to save history: {}", e));
        }
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries oldest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unseen_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.seen).count()
    }

    pub fn mark_all_seen(&mut self) {
        if self.unseen_count() == 0 {
            return;
        }
        for entry in self.entries.iter_mut() {
            entry.seen = true;
        }
        self.persist();
    }
}

impl HistorySink for HistoryLog {
    fn append(&mut self, message: &str, timestamp_ms: u64) {
        self.entries.push_back(HistoryEntry {
            timestamp_ms,
            recorded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: message.to_string(),
            seen: false,
        });
        self.trim();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = HistoryLog::in_memory(3);
        for i in 0..5u64 {
            log.append(&format!("event {}", i), i * 10);
        }
        let messages: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["event 2", "event 3", "event 4"]);
    }

    #[test]
    fn test_seen_tracking() {
        let mut log = HistoryLog::in_memory(50);
        log.append("a", 1);
        log.append("b", 2);
        assert_eq!(log.unseen_count(), 2);
        log.mark_all_seen();
        assert_eq!(log.unseen_count(), 0);
        log.append("c", 3);
        assert_eq!(log.unseen_count(), 1);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        {
            let mut log = HistoryLog::open(&path, 50);
            log.append(r#"{"events":["VBUS_PRESENCE_CHANGE"]}"#, 1234);
            log.mark_all_seen();
        }
        let log = HistoryLog::open(&path, 50);
        assert_eq!(log.len(), 1);
        let entry = &log.entries()[0];
        assert_eq!(entry.timestamp_ms, 1234);
        assert!(entry.seen);
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.recorded_at).is_ok());
    }

    #[test]
    fn test_reopen_with_smaller_capacity_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        {
            let mut log = HistoryLog::open(&path, 10);
            for i in 0..10 {
                log.append("x", i);
            }
        }
        let log = HistoryLog::open(&path, 4);
        assert_eq!(log.len(), 4);
        assert_eq!(log.entries()[0].timestamp_ms, 6);
    }
}
