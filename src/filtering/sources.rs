//! Blocklist source configuration.

use serde::Deserialize;
use std::collections::HashMap;

use super::catalog::ListDefinition;

/// A loadable blocklist origin: a filesystem path or an HTTP(S) URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub location: String,
    pub enabled: bool,
    pub auth: AuthConfig,
}

/// Optional authentication for a source: basic credentials, or a token
/// sent as `<header>: <scheme> <token>` (defaults `Authorization` and
/// `Bearer`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub token: String,
    pub header: String,
    pub scheme: String,
}

impl AuthConfig {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty() && self.token.is_empty()
    }
}

/// Per-list configuration table (`[filtering.<id>]`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    pub enabled: bool,
    pub url: String,
    pub username: String,
    pub password: String,
    pub token: String,
    pub header: String,
    pub scheme: String,
}

/// Convert per-list tables and custom entries into the source list.
///
/// A list with no `url` falls back to the catalog entry for its id; lists
/// that resolve to no location contribute nothing. Custom entries get
/// generated ids (`custom_1`, `custom_2`, …) in configuration order.
pub fn build_sources(
    catalog: &HashMap<&'static str, ListDefinition>,
    configs: &HashMap<String, ListConfig>,
    custom: &[String],
) -> Vec<Source> {
    let mut sources = Vec::new();

    // HashMap iteration order is arbitrary; sort so reload cycles see the
    // same source order as each other.
    let mut ids: Vec<&String> = configs.keys().collect();
    ids.sort();

    for id in ids {
        let cfg = &configs[id];
        if !cfg.enabled {
            continue;
        }
        let mut location = cfg.url.clone();
        if location.is_empty() {
            if let Some(def) = catalog.get(id.as_str()) {
                location = def.url.to_string();
            }
        }
        if location.is_empty() {
            continue;
        }
        sources.push(Source {
            id: id.clone(),
            location,
            enabled: true,
            auth: AuthConfig {
                username: cfg.username.clone(),
                password: cfg.password.clone(),
                token: cfg.token.clone(),
                header: cfg.header.clone(),
                scheme: cfg.scheme.clone(),
            },
        });
    }

    for (i, entry) in custom.iter().enumerate() {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        sources.push(Source {
            id: format!("custom_{}", i + 1),
            location: trimmed.to_string(),
            enabled: true,
            auth: AuthConfig::default(),
        });
    }

    sources
}
