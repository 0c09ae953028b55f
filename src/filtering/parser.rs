//! Blocklist parsing.
//!
//! Accepts hosts-file lines (`IP host1 host2 …`), bare domains, and
//! `*.parent` wildcard entries. Comments start with `#`, `//`, or `;`,
//! full-line or inline. Invalid entries are counted and reported through
//! an error limiter so a broken list cannot flood the log.

use std::net::IpAddr;
use tracing::{error, info, warn};

use super::domain_set::{normalize, DomainSet};

/// Summary of one list parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_lines: usize,
    pub domains: usize,
    pub invalid: usize,
}

pub(crate) struct ParseOptions<'a> {
    pub list_id: &'a str,
    /// Maximum per-entry diagnostics; 0 suppresses them entirely.
    pub error_limit: usize,
}

struct ErrorLimiter {
    limit: usize,
    count: usize,
}

impl ErrorLimiter {
    fn new(limit: usize) -> Self {
        Self { limit, count: 0 }
    }

    fn log(&mut self, list_id: &str, line_num: usize, token: &str, reason: &str) {
        if self.limit == 0 {
            return;
        }
        self.count += 1;
        if self.count > self.limit {
            return;
        }
        error!(
            list = list_id,
            line = line_num,
            entry = token,
            reason = reason,
            "invalid blocklist entry"
        );
    }

    fn summary(&self, list_id: &str, invalid: usize) {
        if self.limit == 0 {
            return;
        }
        if invalid > self.limit {
            warn!(
                list = list_id,
                errors = invalid,
                logged = self.limit,
                "blocklist parsing errors suppressed"
            );
        }
    }
}

/// Parse list `contents` into a `DomainSet`.
pub(crate) fn parse_list(contents: &str, opts: ParseOptions<'_>) -> (DomainSet, ParseStats) {
    let mut stats = ParseStats::default();
    let mut limiter = ErrorLimiter::new(opts.error_limit);
    let mut set = DomainSet::new();

    for (idx, raw_line) in contents.lines().enumerate() {
        let line_num = idx + 1;
        let line = strip_bom(raw_line).trim();
        stats.total_lines += 1;

        if line.is_empty() || is_comment(line) {
            continue;
        }

        let mut tokens = line.split_whitespace().peekable();

        // Hosts-file format: drop a leading IP address
        if let Some(first) = tokens.peek() {
            if first.parse::<IpAddr>().is_ok() {
                tokens.next();
            }
        }

        for token in tokens {
            if is_comment(token) {
                break;
            }
            match add_token(&mut set, token) {
                Ok(()) => stats.domains += 1,
                Err(reason) => {
                    stats.invalid += 1;
                    limiter.log(opts.list_id, line_num, token, reason);
                }
            }
        }
    }

    limiter.summary(opts.list_id, stats.invalid);
    info!(
        list = opts.list_id,
        domains = stats.domains,
        invalid = stats.invalid,
        "parsed blocklist"
    );

    (set, stats)
}

fn add_token(set: &mut DomainSet, token: &str) -> Result<(), &'static str> {
    let name = token.trim();
    if name.is_empty() {
        return Err("empty entry");
    }
    if name.contains("://") || name.contains('/') || name.contains(':') {
        return Err("invalid hostname");
    }
    if name.parse::<IpAddr>().is_ok() {
        return Err("ip literals are not domains");
    }

    if let Some(suffix) = name.strip_prefix("*.") {
        let canonical = normalize(suffix);
        if !is_hostname(&canonical) {
            return Err("invalid domain");
        }
        set.add_wildcard(&canonical);
        return Ok(());
    }

    let canonical = normalize(name);
    if !is_hostname(&canonical) {
        return Err("invalid domain");
    }
    set.add_exact(&canonical);
    Ok(())
}

/// Basic hostname-form check on an already-normalized name: non-empty
/// labels of letters, digits, hyphens, and underscores, 63 octets max,
/// no hyphen at either edge, 253 octets total.
fn is_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

fn is_comment(text: &str) -> bool {
    text.starts_with('#') || text.starts_with("//") || text.starts_with(';')
}
