//! Locally configured DNS records.
//!
//! Records come from a line-oriented file (`name kind content`) and answer
//! A and CNAME queries authoritatively. Lookups support wildcard keys of
//! the form `*.parent.example.com.`; a wildcard matches any name with at
//! least one label to the left of its suffix, never the bare suffix itself.
//!
//! Reloads parse into a fresh map without holding the lock, then swap the
//! map under the write guard so readers only ever see a complete store.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Kind of a locally served record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    A,
    Cname,
}

/// Typed payload of a local record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// IPv4 address for an `a` entry
    A(Ipv4Addr),
    /// Target name for a `cname` entry, stored lowercased without a
    /// trailing dot (the handler appends one when answering)
    Cname(String),
}

impl RecordData {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::A(_) => RecordKind::A,
            RecordData::Cname(_) => RecordKind::Cname,
        }
    }
}

/// A single local record entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRecord {
    /// Lowercased FQDN ending in '.'
    pub name: String,
    pub data: RecordData,
}

/// In-memory store of local records, shared across the server.
#[derive(Debug, Default)]
pub struct RecordsStore {
    records: RwLock<HashMap<String, LocalRecord>>,
}

impl RecordsStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a record by name, falling back to wildcard keys.
    ///
    /// The exact key wins. Otherwise each proper parent suffix is probed
    /// as `*.<suffix>`, nearest suffix first. The loop stops before the
    /// last label so a wildcard never matches its own parent.
    pub fn get(&self, name: &str) -> Option<LocalRecord> {
        let name = name.to_lowercase();
        let records = self.records.read();

        if let Some(record) = records.get(&name) {
            return Some(record.clone());
        }

        let labels: Vec<&str> = name.split('.').collect();
        for i in 1..labels.len().saturating_sub(1) {
            let wildcard = format!("*.{}", labels[i..].join("."));
            if let Some(record) = records.get(&wildcard) {
                return Some(record.clone());
            }
        }

        None
    }

    /// Snapshot of the current record map.
    pub fn get_all(&self) -> HashMap<String, LocalRecord> {
        self.records.read().clone()
    }

    /// Insert or replace a single record.
    pub fn add(&self, name: impl Into<String>, data: RecordData) {
        let name = name.into().to_lowercase();
        self.records.write().insert(
            name.clone(),
            LocalRecord { name, data },
        );
    }

    /// Parse `path` and replace the store contents with the result.
    ///
    /// Path and file-open errors are returned without touching the current
    /// records. Lines that do not parse are skipped with a warning; the
    /// remaining valid lines become the new store.
    pub fn load_from_file(&self, path: &str) -> Result<usize> {
        let resolved = sanitize_records_path(path)?;
        let contents = std::fs::read_to_string(&resolved)?;

        let fresh = parse_records(&contents);
        let count = fresh.len();

        *self.records.write() = fresh;

        info!(from_file = %resolved.display(), num_records = count, "loaded records");
        Ok(count)
    }
}

fn parse_records(contents: &str) -> HashMap<String, LocalRecord> {
    let mut records = HashMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            warn!(line = %line, "invalid record format");
            continue;
        }

        let mut name = fields[0].to_lowercase();
        if !name.ends_with('.') {
            name.push('.');
        }

        let content = fields[2].to_lowercase();
        let data = match fields[1].to_lowercase().as_str() {
            "a" => match content.parse::<Ipv4Addr>() {
                Ok(addr) => RecordData::A(addr),
                Err(_) => {
                    warn!(content = %content, line = %line, "invalid ipv4 address for record content");
                    continue;
                }
            },
            "cname" => RecordData::Cname(content),
            other => {
                warn!(kind = %other, line = %line, "invalid record type");
                continue;
            }
        };

        records.insert(name.clone(), LocalRecord { name, data });
    }

    records
}

/// Reject empty, bare-directory, and working-directory-escaping paths.
fn sanitize_records_path(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        return Err(Error::Records("records path is empty".to_string()));
    }

    let clean = Path::new(path);
    if clean == Path::new(".") || clean == Path::new("/") {
        return Err(Error::Records(format!(
            "records path {:?} resolves to a directory",
            path
        )));
    }

    if !clean.is_absolute() && clean.components().next() == Some(Component::ParentDir) {
        return Err(Error::Records(format!(
            "records path {:?} escapes the working directory",
            path
        )));
    }

    Ok(clean.to_path_buf())
}
