//! resolvit - a recursive-forwarding DNS server
//!
//! resolvit answers queries from a hot-reloadable local records file,
//! filters unwanted domains against configurable blocklists, and forwards
//! everything else to upstream resolvers with UDP-to-TCP truncation
//! fallback. Results are cached per question and transport.
//!
//! # Architecture
//!
//! - `dns`: DNS protocol facade (messages, records, wire format)
//! - `server`: UDP and TCP listeners plus the request pipeline
//! - `records`: locally configured A/CNAME records with wildcard lookup
//! - `cache`: TTL cache keyed by question and transport
//! - `forward`: ordered upstream failover with truncation retry
//! - `filtering`: blocklist/allowlist engine with periodic refresh
//! - `config`: TOML configuration loading and validation
//! - `logging`: tracing subscriber setup

/// DNS protocol facade
///
/// Message parsing, serialization, and the core DNS types.
pub mod dns;

/// UDP and TCP DNS servers and the request handler pipeline
pub mod server;

/// Local records store with wildcard lookup and atomic reload
pub mod records;

/// TTL cache for DNS responses
pub mod cache;

/// Upstream forwarding with ordered failover
pub mod forward;

/// Content filtering: domain sets, list sources, refresh loop
pub mod filtering;

/// Configuration loading and validation
pub mod config;

/// Logging initialization utilities
pub mod logging;

#[cfg(test)]
pub(crate) mod test_support;

/// Error types and handling
pub mod error {

    use thiserror::Error;

    /// Main error type for resolvit
    #[derive(Error, Debug)]
    pub enum Error {
        /// DNS protocol error
        #[error("DNS protocol error: {0}")]
        DnsProtocol(String),

        /// Configuration error
        #[error("Configuration error: {0}")]
        Config(String),

        /// Records file error
        #[error("Records error: {0}")]
        Records(String),

        /// Upstream exchange error
        #[error("Upstream error: {0}")]
        Upstream(String),

        /// Blocklist source error
        #[error("Filtering error: {0}")]
        Filtering(String),

        /// IO error
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    /// Result type for resolvit operations
    pub type Result<T> = std::result::Result<T, Error>;
}

pub use error::{Error, Result};
