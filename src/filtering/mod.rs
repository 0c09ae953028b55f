//! Content filtering.
//!
//! A composite blocklist is assembled from configured sources (local files
//! or HTTP lists, optionally authenticated) and checked on every query; a
//! separate allowlist always wins. Sets are swapped atomically so the
//! query path never sees a half-built list, and a background task
//! refreshes them on the configured interval.

pub mod blocked_log;
pub mod catalog;
pub mod domain_set;
pub mod filter;
pub mod loader;
pub mod parser;
pub mod sources;

pub use catalog::{catalog, ListDefinition};
pub use domain_set::DomainSet;
pub use filter::{Filter, FilterOptions};
pub use parser::ParseStats;
pub use sources::{build_sources, AuthConfig, ListConfig, Source};
