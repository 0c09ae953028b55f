//! resolvit - a recursive-forwarding DNS server.
//!
//! Boots the service: configuration, logging, local records, the
//! filtering engine, and the UDP+TCP server pair. Runs until SIGINT or
//! SIGTERM; SIGHUP reloads the records file and clears the cache.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use resolvit::cache::DnsCache;
use resolvit::config::Config;
use resolvit::filtering::{build_sources, catalog, Filter, FilterOptions};
use resolvit::forward::Forwarder;
use resolvit::logging;
use resolvit::records::RecordsStore;
use resolvit::server::{Resolver, Server};
use tokio::sync::watch;
use tracing::{error, info};

/// Control events delivered by the signal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlEvent {
    Reload,
    Shutdown,
}

/// One stream of control events for the lifetime of the process.
struct ControlEvents {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sighup: tokio::signal::unix::Signal,
}

impl ControlEvents {
    fn new() -> anyhow::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                sigterm: signal(SignalKind::terminate())?,
                sighup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn next(&mut self) -> anyhow::Result<ControlEvent> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res?;
                    info!("received Ctrl-C");
                    Ok(ControlEvent::Shutdown)
                }
                _ = self.sigterm.recv() => {
                    info!("received SIGTERM");
                    Ok(ControlEvent::Shutdown)
                }
                _ = self.sighup.recv() => {
                    info!("received SIGHUP");
                    Ok(ControlEvent::Reload)
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            Ok(ControlEvent::Shutdown)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = cli::parse_args() else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::setup(),
    }
    .map_err(|e| anyhow::anyhow!("setup config: {}", e))?;

    logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("setup logging: {}", e))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %config.server.listen,
        "starting DNS server"
    );

    let records = Arc::new(RecordsStore::new());
    if !config.records.resolve_from.is_empty() {
        records
            .load_from_file(&config.records.resolve_from)
            .map_err(|e| anyhow::anyhow!("load records: {}", e))?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut filter = None;
    let mut refresh_task = None;
    if config.filtering.enabled {
        let sources = build_sources(
            &catalog(),
            &config.filtering.lists,
            &config.filtering.custom.list,
        );
        let built = Arc::new(Filter::new(FilterOptions {
            enabled: true,
            block_subdomains: config.filtering.block_subdomains,
            allowlist_path: config.filtering.allowlist.path.clone(),
            sources,
            cache_dir: config.filtering.cache_dir.clone(),
            update_interval: config.filtering.update_interval_duration(),
            blocked_log_path: config.filtering.blocked_log.clone(),
            error_limit: config.logging.blocklist_error_limit as usize,
        }));
        refresh_task = Arc::clone(&built).start(shutdown_rx.clone()).await;
        filter = Some(built);
    }

    let cache = Arc::new(DnsCache::new());
    let forwarder = Arc::new(Forwarder::new(config.upstream.servers.clone()));
    let resolver = Resolver::new(
        Arc::clone(&cache),
        Arc::clone(&records),
        forwarder,
        filter,
    );

    let server = Arc::new(
        Server::bind(&config.server.listen, Arc::new(resolver), cache)
            .await
            .map_err(|e| anyhow::anyhow!("bind {}: {}", config.server.listen, e))?,
    );

    let serving = Arc::clone(&server);
    tokio::spawn(async move {
        if let Err(e) = serving.run().await {
            error!(error = %e, "server loop failed");
        }
    });

    let mut events = ControlEvents::new()?;
    loop {
        match events.next().await? {
            ControlEvent::Reload => {
                info!("reloading records");
                if config.records.resolve_from.is_empty() {
                    server.clear_cache();
                    continue;
                }
                match records.load_from_file(&config.records.resolve_from) {
                    Ok(_) => {
                        server.clear_cache();
                        info!("records reloaded successfully");
                    }
                    Err(e) => {
                        error!(error = %e, "failed to reload records");
                    }
                }
            }
            ControlEvent::Shutdown => {
                info!("shutting down");
                let _ = shutdown_tx.send(true);
                if let Some(task) = refresh_task.take() {
                    if tokio::time::timeout(Duration::from_secs(5), task).await.is_err() {
                        error!("filter refresh loop did not stop in time");
                    }
                }
                break;
            }
        }
    }

    Ok(())
}
