//! Persistence of user-applied field values
//!
//! The store is a flat map from field name to the last physical value
//! written successfully. It performs no validation of its own; everything it
//! holds went through the validated writer first.

use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Key/value store for persisted settings
pub trait SettingsStore: Send {
    /// Every stored entry, in insertion order
    fn get_all(&self) -> Result<Vec<(String, i64)>>;

    /// Insert or overwrite one entry
    fn set(&mut self, name: &str, value: i64) -> Result<()>;

    fn clear_all(&mut self) -> Result<()>;
}

/// Settings kept in a single JSON object on disk
pub struct JsonSettingsStore {
    file_path: PathBuf,
    entries: Map<String, Value>,
    logger: StructuredLogger,
}

impl JsonSettingsStore {
    /// Open the store, loading any existing file
    ///
    /// A missing file is an empty store. An unreadable one is logged and
    /// treated as empty so a corrupt file never blocks boot.
    pub fn open<P: AsRef<Path>>(file_path: P) -> Self {
        let logger = get_logger("settings");
        let file_path = file_path.as_ref().to_path_buf();
        let entries = match Self::load(&file_path) {
            Ok(Some(entries)) => {
                logger.info(&format!(
                    "Loaded {} persisted settings from {}",
                    entries.len(),
                    file_path.display()
                ));
                entries
            }
            Ok(None) => {
                logger.info("No persisted settings file found, starting empty");
                Map::new()
            }
            Err(e) => {
                logger.warn(&format!(
                    "Ignoring unreadable settings file {}: {}",
                    file_path.display(),
                    e
                ));
                Map::new()
            }
        };

        Self {
            file_path,
            entries,
            logger,
        }
    }

    fn load(path: &Path) -> Result<Option<Map<String, Value>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write `entries` to disk; the in-memory copy is left to the caller
    fn save(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved persisted settings to disk");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_all(&self) -> Result<Vec<(String, i64)>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            match value.as_i64() {
                Some(v) => out.push((name.clone(), v)),
                None => self
                    .logger
                    .warn(&format!("Skipping non-integer setting {}={}", name, value)),
            }
        }
        Ok(out)
    }

    fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let mut next = self.entries.clone();
        next.insert(name.to_string(), Value::from(value));
        self.save(&next)?;
        self.entries = next;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.save(&Map::new())?;
        self.entries.clear();
        self.logger.info("Cleared all persisted settings");
        Ok(())
    }
}

/// Volatile store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    entries: Arc<Mutex<Vec<(String, i64)>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let store = Self::new();
        store
            .lock()
            .extend(entries.into_iter().map(|(n, v)| (n.into(), v)));
        store
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, i64)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.lock().iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_all(&self) -> Result<Vec<(String, i64)>> {
        Ok(self.lock().clone())
    }

    fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let mut entries = self.lock();
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => entries.push((name.to_string(), value)),
        }
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }
}
