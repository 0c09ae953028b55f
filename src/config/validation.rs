//! Configuration validation.
//!
//! Runs once at load time; anything that fails here is fatal at startup.

use std::net::IpAddr;

use super::{loader, Config};
use crate::{Error, Result};

const VALID_LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

/// Validate and normalize the parsed configuration in place.
pub fn validate_config(config: &mut Config) -> Result<()> {
    validate_log_level(&config.logging.level)?;

    if config.server.listen.is_empty() {
        return Err(Error::Config("server.listen is required".to_string()));
    }
    validate_address(&config.server.listen)
        .map_err(|e| Error::Config(format!("invalid server.listen: {}", e)))?;

    if config.upstream.servers.is_empty() {
        return Err(Error::Config(
            "upstream.servers must contain at least one entry".to_string(),
        ));
    }
    for server in config.upstream.servers.iter_mut() {
        let parsed = parse_upstream(server);
        validate_address(&parsed)
            .map_err(|e| Error::Config(format!("invalid upstream address {}: {}", server, e)))?;
        *server = parsed;
    }

    if config.logging.blocklist_error_limit < 0 {
        return Err(Error::Config(
            "logging.blocklist_error_limit must be >= 0".to_string(),
        ));
    }

    loader::parse_duration(&config.filtering.update_interval)
        .map_err(|e| Error::Config(format!("invalid filtering.update_interval: {}", e)))?;

    let records_file = &config.records.resolve_from;
    if !records_file.is_empty() && std::fs::metadata(records_file).is_err() {
        return Err(Error::Config(format!(
            "records.resolve_from not accessible: {}",
            records_file
        )));
    }

    Ok(())
}

/// Check that the log level is one of the supported names.
pub fn validate_log_level(level: &str) -> Result<()> {
    if !VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Err(Error::Config(format!(
            "invalid log level: {} (must be one of: debug, info, warn, error)",
            level
        )));
    }
    Ok(())
}

/// Check that an address is `IP:port` with a numeric UDP-valid port.
pub fn validate_address(addr: &str) -> Result<()> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| Error::Config(format!("invalid address format {}", addr)))?;

    if port.is_empty() {
        return Err(Error::Config("invalid port".to_string()));
    }
    port.parse::<u16>()
        .map_err(|_| Error::Config(format!("invalid port: {}", port)))?;

    // IPv6 hosts come bracketed: [::1]:53
    let host = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')).unwrap_or(host);
    host.parse::<IpAddr>()
        .map_err(|_| Error::Config(format!("invalid IP address: {}", host)))?;

    Ok(())
}

/// Append the default DNS port when an upstream comes without one.
pub fn parse_upstream(upstream: &str) -> String {
    if !upstream.contains(':') {
        return format!("{}:53", upstream);
    }
    upstream.to_string()
}
