//! Logging initialization.
//!
//! Builds the global `tracing` subscriber from the logging configuration:
//! an `EnvFilter` derived from the configured level (a non-empty
//! `RUST_LOG` wins), plain text formatting, and either stdout or an
//! append-only file as the sink.

use std::path::{Component, Path};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Error, Result};

/// Effective filter spec: `RUST_LOG` when set, otherwise the configured
/// level for this crate with external crates kept at `warn`.
pub(crate) fn effective_log_spec(cfg: &LoggingConfig) -> String {
    match std::env::var("RUST_LOG") {
        Ok(v) if !v.is_empty() => v,
        _ => format!("warn,resolvit={}", cfg.level.to_lowercase()),
    }
}

/// Install the global subscriber according to `cfg`.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let spec = effective_log_spec(cfg);
    let filter =
        EnvFilter::try_new(&spec).unwrap_or_else(|_| EnvFilter::new("warn,resolvit=info"));

    if cfg.file == "stdout" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| Error::Config(format!("init logging: {}", e)))?;
        return Ok(());
    }

    let path = sanitize_log_path(&cfg.file)?;
    let mut options = std::fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(&path)
        .map_err(|e| Error::Config(format!("open log file {}: {}", path, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Config(format!("init logging: {}", e)))?;

    Ok(())
}

/// Reject empty, bare-directory, and working-directory-escaping log paths.
fn sanitize_log_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::Config("log file path is empty".to_string()));
    }

    let clean = Path::new(path);
    if clean == Path::new(".") || clean == Path::new("/") {
        return Err(Error::Config(format!(
            "log file path {:?} resolves to a directory",
            path
        )));
    }
    if !clean.is_absolute() && clean.components().next() == Some(Component::ParentDir) {
        return Err(Error::Config(format!(
            "log file path {:?} escapes the working directory",
            path
        )));
    }

    Ok(path.to_string())
}
