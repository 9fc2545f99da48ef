//! JSON-lines audit file
//!
//! Entries are serialized up front and appended with one write, so a
//! serialization failure never leaves half a batch on disk.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{LedgerError, LedgerResult};

use super::entry::AuditEntry;

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append `entries` in order. An empty slice does not touch the file.
    pub fn append(&self, entries: &[AuditEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for entry in entries {
            buffer.push_str(&serde_json::to_string(entry)?);
            buffer.push('\n');
        }

        let io_err =
            |e: std::io::Error| LedgerError::Io(format!("audit log {:?}: {}", self.log_path, e));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(io_err)?;
        file.write_all(buffer.as_bytes()).map_err(io_err)?;
        file.sync_data().map_err(io_err)
    }

    /// Every entry in the log, oldest first; a missing file reads as empty
    pub fn entries(&self) -> LedgerResult<Vec<AuditEntry>> {
        let contents = match fs::read_to_string(&self.log_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|e| {
                    LedgerError::Json(format!("audit log line {}: {}", idx + 1, e))
                })
            })
            .collect()
    }

    /// The last `count` entries, oldest first
    pub fn tail(&self, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        let entries = self.entries()?;
        let skip = entries.len().saturating_sub(count);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn budget_entry(i: usize) -> AuditEntry {
        AuditEntry::create(
            EntityType::Budget,
            format!("bud-{}", i),
            Some(format!("Budget {}", i)),
            &json!({"index": i}),
        )
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.append(&[budget_entry(0)]).unwrap();

        let entries = logger.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Budget);
    }

    #[test]
    fn test_log_batch_and_recent() {
        let (logger, _temp) = create_test_logger();
        let entries: Vec<_> = (0..10).map(budget_entry).collect();
        logger.append(&entries).unwrap();

        let recent = logger.tail(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].entity_id, "bud-7");
        assert_eq!(recent[2].entity_id, "bud-9");
    }

    #[test]
    fn test_empty_log() {
        let (logger, temp) = create_test_logger();
        assert!(logger.entries().unwrap().is_empty());
        assert!(logger.tail(5).unwrap().is_empty());
        logger.append(&[]).unwrap();
        assert!(!temp.path().join("audit.log").exists());
    }

    #[test]
    fn test_corrupt_line_reports_its_number() {
        let (logger, temp) = create_test_logger();
        logger.append(&[budget_entry(0)]).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(temp.path().join("audit.log"))
            .unwrap();
        writeln!(file, "\n{{not json").unwrap();

        match logger.entries().unwrap_err() {
            LedgerError::Json(msg) => assert!(msg.contains("line 3"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reopen_reads_existing_entries() {
        let (logger, temp) = create_test_logger();
        logger.append(&[budget_entry(1)]).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        assert_eq!(reopened.entries().unwrap().len(), 1);
    }
}
