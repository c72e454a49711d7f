// logger.rs - Run-scoped diagnostic log
// Purpose: Append verbosity-gated entries to run.log, optionally echoing them
//          to the console

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ReconResult;

/// Round start/end, merge summaries
pub const MILESTONE: u8 = 1;
/// Per-link extraction detail
pub const DETAIL: u8 = 2;
/// Raw page bodies
pub const RAW: u8 = 3;

pub const LOG_FILE: &str = "run.log";

/// What a log entry carries. The caller picks the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LogPayload {
    Text(String),
    Mapping(Value),
}

impl LogPayload {
    /// Structured payload from anything serializable (frequency maps, tables)
    pub fn mapping<T: Serialize>(value: &T) -> Self {
        LogPayload::Mapping(serde_json::to_value(value).unwrap_or_default())
    }

    pub fn render(&self) -> String {
        match self {
            LogPayload::Text(text) => text.clone(),
            LogPayload::Mapping(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<&str> for LogPayload {
    fn from(text: &str) -> Self {
        LogPayload::Text(text.to_string())
    }
}

impl From<String> for LogPayload {
    fn from(text: String) -> Self {
        LogPayload::Text(text)
    }
}

pub struct RunLog {
    verbosity: u8,
    path: Option<PathBuf>,
    file: Option<Mutex<File>>,
}

impl RunLog {
    /// A log that writes nothing (verbosity 0)
    pub fn disabled() -> Self {
        Self {
            verbosity: 0,
            path: None,
            file: None,
        }
    }

    /// Open `path` for appending. Verbosity 0 never touches the filesystem.
    pub fn open(path: &Path, verbosity: u8) -> ReconResult<Self> {
        if verbosity == 0 {
            return Ok(Self::disabled());
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            verbosity,
            path: Some(path.to_path_buf()),
            file: Some(Mutex::new(file)),
        })
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn enabled(&self, level: u8) -> bool {
        self.file.is_some() && self.verbosity >= level
    }

    /// Persist `payload` if the configured verbosity reaches `level`
    pub fn log(&self, payload: impl Into<LogPayload>, level: u8) {
        if !self.enabled(level) {
            return;
        }
        self.write_entry(&payload.into());
    }

    /// Print `payload` and persist it under the same rules as [`RunLog::log`]
    pub fn echo(&self, payload: impl Into<LogPayload>, level: u8) {
        let payload = payload.into();
        println!("{}", payload.render());
        if self.enabled(level) {
            self.write_entry(&payload);
        }
    }

    fn write_entry(&self, payload: &LogPayload) {
        let Some(file) = &self.file else {
            return;
        };

        let stamp = Local::now().format("%d-%b-%Y %H:%M:%S %Z");
        if let Ok(mut file) = file.lock() {
            writeln!(file, "[{}]: {}", stamp, payload.render()).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_disabled_log_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);

        let log = RunLog::open(&path, 0).unwrap();
        log.log("never written", MILESTONE);

        assert!(!log.enabled(MILESTONE));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_reports_path_and_verbosity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);

        let log = RunLog::open(&path, RAW).unwrap();
        assert_eq!(log.path(), Some(path.as_path()));
        assert_eq!(log.verbosity(), RAW);

        let off = RunLog::open(&path, 0).unwrap();
        assert_eq!(off.path(), None);
        assert_eq!(RunLog::disabled().verbosity(), 0);
    }

    #[test]
    fn test_level_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);

        let log = RunLog::open(&path, DETAIL).unwrap();
        log.log("round one", MILESTONE);
        log.log("link fetched", DETAIL);
        log.log("<html>raw</html>", RAW);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("round one"));
        assert!(content.contains("link fetched"));
        assert!(!content.contains("<html>raw</html>"));
    }

    #[test]
    fn test_mapping_payload_is_indented() {
        let mut counts = HashMap::new();
        counts.insert("mail.example.org".to_string(), 2usize);

        let rendered = LogPayload::mapping(&counts).render();
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("\"mail.example.org\": 2"));
    }

    #[test]
    fn test_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);

        RunLog::open(&path, MILESTONE).unwrap().log("first run", MILESTONE);
        RunLog::open(&path, MILESTONE).unwrap().log("second run", MILESTONE);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.starts_with('[')));
    }
}
