//! Boot-time restore of persisted settings

use crate::error::ChargerError;
use crate::logging::get_logger;
use crate::writer::ValidatedWriter;

/// What a replay did, field by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: Vec<String>,
    pub failed: Vec<(String, ChargerError)>,
}

impl ReplayReport {
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write every stored setting back through the validated writer
///
/// Entries are applied in store order. A failing entry is logged and the
/// replay moves on; no cross-field ordering is enforced.
pub async fn replay(writer: &mut ValidatedWriter) -> ReplayReport {
    let logger = get_logger("replay");
    let mut report = ReplayReport::default();

    let entries = match writer.store().get_all() {
        Ok(entries) => entries,
        Err(e) => {
            logger.error(&format!("Cannot read persisted settings: {}", e));
            return report;
        }
    };
    logger.info(&format!("Applying {} saved settings", entries.len()));

    for (name, value) in entries {
        match writer.write(&name, value).await {
            Ok(()) => report.applied.push(name),
            Err(e) => {
                logger.warn(&format!(
                    "Failed to restore {}={} ({}): {}",
                    name,
                    value,
                    e.kind(),
                    e
                ));
                report.failed.push((name, e));
            }
        }
    }

    logger.info(&format!(
        "Finished applying settings: {} applied, {} failed",
        report.applied.len(),
        report.failed.len()
    ));
    report
}
