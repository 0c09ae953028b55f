//! TTL cache for DNS responses.
//!
//! Entries are keyed by question name, type, and transport. The transport
//! partition keeps UDP-truncated and TCP-complete copies of the same
//! answer from shadowing each other. Expired entries count as misses and
//! are overwritten by the next `set` for the same key.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::dns::Message;
use crate::server::Transport;

/// TTL applied when a response has no answer records.
const NO_ANSWER_TTL: Duration = Duration::from_secs(60);

/// Cache key: lowercased question name, query type, and transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    qtype: u16,
    transport: Transport,
}

impl CacheKey {
    pub fn new(name: &str, qtype: u16, transport: Transport) -> Self {
        Self {
            name: name.to_lowercase(),
            qtype,
            transport,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.name, self.qtype, self.transport)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    msg: Message,
    expires_at: Instant,
}

/// TTL-aware response cache shared by both listeners.
#[derive(Debug, Default)]
pub struct DnsCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl DnsCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached message when present and not expired.
    ///
    /// The caller owns the copy and is responsible for rewriting the
    /// transaction id and RA flag before sending.
    pub fn get(&self, key: &CacheKey) -> Option<Message> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if Instant::now() > entry.expires_at {
            debug!(key = %key, "cache entry expired");
            return None;
        }
        Some(entry.msg.clone())
    }

    /// Store a response with an expiry derived from the first answer's TTL
    /// (60 s when the answer section is empty).
    pub fn set(&self, key: CacheKey, msg: Message) {
        let ttl = msg
            .answers()
            .first()
            .map(|rr| Duration::from_secs(u64::from(rr.ttl())))
            .unwrap_or(NO_ANSWER_TTL);

        let entry = CacheEntry {
            msg,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key, entry);
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        *self.entries.write() = HashMap::new();
        info!("cache cleared");
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
