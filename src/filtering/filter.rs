//! Query-time filtering policy.
//!
//! The blocklist and allowlist live behind `ArcSwap` cells: `load_once`
//! builds fresh sets off the query path and swaps them in, so readers
//! never lock and never observe a half-built set. The allowlist always
//! wins over the blocklist.

use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::blocked_log::BlockedLog;
use super::domain_set::DomainSet;
use super::loader::{load_allowlist, load_sources};
use super::sources::Source;
use crate::dns::RecordType;

/// Everything a `Filter` needs, assembled from configuration.
#[derive(Debug, Default)]
pub struct FilterOptions {
    pub enabled: bool,
    pub block_subdomains: bool,
    pub allowlist_path: String,
    pub sources: Vec<Source>,
    pub cache_dir: String,
    pub update_interval: Duration,
    pub blocked_log_path: String,
    pub error_limit: usize,
}

/// Composite blocklist/allowlist with periodic refresh.
pub struct Filter {
    enabled: bool,
    block_subdomains: bool,
    allowlist_path: String,
    sources: Vec<Source>,
    cache_dir: String,
    update_interval: Duration,
    error_limit: usize,
    blocked_log: Option<BlockedLog>,
    blocklist: ArcSwap<DomainSet>,
    allowlist: ArcSwap<DomainSet>,
}

impl Filter {
    pub fn new(opts: FilterOptions) -> Self {
        Self {
            enabled: opts.enabled,
            block_subdomains: opts.block_subdomains,
            allowlist_path: opts.allowlist_path,
            sources: opts.sources,
            cache_dir: opts.cache_dir,
            update_interval: opts.update_interval,
            error_limit: opts.error_limit,
            blocked_log: BlockedLog::open(&opts.blocked_log_path),
            blocklist: ArcSwap::from_pointee(DomainSet::new()),
            allowlist: ArcSwap::from_pointee(DomainSet::new()),
        }
    }

    /// Rebuild both sets from their sources and swap them in.
    ///
    /// Per-source failures are logged inside the loader and do not abort
    /// the aggregate; an unreadable allowlist leaves an empty allowlist
    /// for this cycle.
    pub async fn load_once(&self) {
        if !self.enabled {
            return;
        }

        let blocklist =
            load_sources(&self.sources, &self.cache_dir, self.error_limit).await;

        let allowlist = match load_allowlist(&self.allowlist_path, self.error_limit) {
            Ok(set) => set,
            Err(e) => {
                error!(error = %e, "failed to load allowlist");
                DomainSet::new()
            }
        };

        info!(
            blocked = blocklist.len(),
            allowed = allowlist.len(),
            "filter lists refreshed"
        );

        self.blocklist.store(Arc::new(blocklist));
        self.allowlist.store(Arc::new(allowlist));
    }

    /// Load once synchronously, then refresh on the configured interval
    /// until `shutdown` fires. Disabled filters and a zero interval both
    /// skip the background task.
    pub async fn start(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        self.load_once().await;

        if self.update_interval.is_zero() {
            return None;
        }

        let filter = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(filter.update_interval);
            // The first tick fires immediately; the synchronous load above
            // already covered it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        filter.load_once().await;
                    }
                    _ = shutdown.changed() => {
                        info!("filter refresh loop stopped");
                        return;
                    }
                }
            }
        });

        Some(handle)
    }

    /// Whether a query for `name` should be answered with NXDOMAIN.
    pub fn should_block(&self, name: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self
            .allowlist
            .load()
            .matches(name, self.block_subdomains)
        {
            return false;
        }
        self.blocklist.load().matches(name, self.block_subdomains)
    }

    /// Record a blocked query when the blocked log is configured.
    pub fn log_blocked(&self, remote_addr: &str, name: &str, qtype: RecordType) {
        if !self.enabled {
            return;
        }
        if let Some(log) = &self.blocked_log {
            log.log(remote_addr, name, qtype);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current blocklist snapshot (tests and diagnostics).
    pub fn blocklist_len(&self) -> usize {
        self.blocklist.load().len()
    }

    #[cfg(test)]
    pub(crate) fn install_sets(&self, blocklist: DomainSet, allowlist: DomainSet) {
        self.blocklist.store(Arc::new(blocklist));
        self.allowlist.store(Arc::new(allowlist));
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("enabled", &self.enabled)
            .field("block_subdomains", &self.block_subdomains)
            .field("sources", &self.sources.len())
            .field("update_interval", &self.update_interval)
            .finish()
    }
}
