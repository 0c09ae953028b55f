//! Blocked-query log.
//!
//! One line per blocked query, appended to a configured file:
//! `<RFC3339 UTC timestamp> client=<remote> type=<qtype> name=<qname>`.
//! Appends are serialized by a mutex. When the file cannot be opened the
//! failure is logged once and blocked-query logging stays disabled.

use chrono::{SecondsFormat, Utc};
use std::fs::File;
use std::io::Write;
use std::sync::Mutex;
use tracing::error;

use crate::dns::RecordType;

#[derive(Debug)]
pub struct BlockedLog {
    file: Mutex<File>,
}

impl BlockedLog {
    /// Open `path` for appending (created 0600 when missing). Returns
    /// `None` for an empty path or when the file cannot be opened.
    pub fn open(path: &str) -> Option<Self> {
        if path.is_empty() {
            return None;
        }

        let mut options = std::fs::OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        match options.open(path) {
            Ok(file) => Some(Self {
                file: Mutex::new(file),
            }),
            Err(e) => {
                error!(path = %path, error = %e, "failed to open blocked log file");
                None
            }
        }
    }

    /// Append one blocked-query line. Write errors are swallowed.
    pub fn log(&self, remote_addr: &str, name: &str, qtype: RecordType) {
        let type_text = match qtype {
            RecordType::Unknown(v) => v.to_string(),
            known => known.to_string(),
        };
        let line = format!(
            "{} client={} type={} name={}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            remote_addr,
            type_text,
            name,
        );

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_disables_logging() {
        assert!(BlockedLog::open("").is_none());
    }

    #[test]
    fn unopenable_path_disables_logging() {
        assert!(BlockedLog::open("/nonexistent-dir/blocked.log").is_none());
    }

    #[test]
    fn log_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.log");
        let log = BlockedLog::open(path.to_str().unwrap()).unwrap();

        log.log("192.0.2.7:49152", "blocked.example.com.", RecordType::A);
        log.log("192.0.2.8:49153", "tracker.example.net.", RecordType::Unknown(64));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("client=192.0.2.7:49152"));
        assert!(lines[0].contains("type=A"));
        assert!(lines[0].contains("name=blocked.example.com."));
        assert!(lines[0].ends_with("name=blocked.example.com."));
        // RFC3339 UTC timestamp leads the line
        assert!(lines[0].split(' ').next().unwrap().ends_with('Z'));
        assert!(lines[1].contains("type=64"));
    }

    #[test]
    fn appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.log");

        {
            let log = BlockedLog::open(path.to_str().unwrap()).unwrap();
            log.log("192.0.2.7:1", "first.example.", RecordType::A);
        }
        {
            let log = BlockedLog::open(path.to_str().unwrap()).unwrap();
            log.log("192.0.2.7:2", "second.example.", RecordType::A);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
