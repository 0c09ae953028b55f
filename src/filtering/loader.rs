//! Blocklist source loading.
//!
//! URL sources are fetched over HTTP with optional authentication and
//! persisted to the cache directory; when a download fails the cached
//! copy stands in. Path sources are read directly. Per-source failures
//! are logged and skipped so one broken list cannot empty the aggregate.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, warn};

use super::domain_set::DomainSet;
use super::parser::{parse_list, ParseOptions};
use super::sources::{AuthConfig, Source};
use crate::{Error, Result};

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Create the cache directory if missing. Returns `None` on failure,
/// which disables caching for this cycle.
pub(crate) fn ensure_cache_dir(cache_dir: &str) -> Option<PathBuf> {
    if cache_dir.is_empty() {
        return None;
    }
    let dir = PathBuf::from(cache_dir);
    match create_cache_dir(&dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "failed to create cache dir, caching disabled");
            None
        }
    }
}

#[cfg(unix)]
fn create_cache_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o750)
        .create(dir)
}

#[cfg(not(unix))]
fn create_cache_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Load every enabled source and merge the results into one set.
pub async fn load_sources(
    sources: &[Source],
    cache_dir: &str,
    error_limit: usize,
) -> DomainSet {
    let mut merged = DomainSet::new();
    let cache_dir = ensure_cache_dir(cache_dir);

    for source in sources {
        if !source.enabled {
            continue;
        }
        match load_source(source, cache_dir.as_deref(), error_limit).await {
            Ok(set) => merged.merge(set),
            Err(e) => {
                error!(list = %source.id, error = %e, "failed to load blocklist");
            }
        }
    }

    merged
}

/// Load the allowlist file (empty path yields an empty set).
pub fn load_allowlist(path: &str, error_limit: usize) -> Result<DomainSet> {
    if path.is_empty() {
        return Ok(DomainSet::new());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Filtering(format!("open allowlist: {}", e)))?;
    let (set, _) = parse_list(
        &contents,
        ParseOptions {
            list_id: "allowlist",
            error_limit,
        },
    );
    Ok(set)
}

async fn load_source(
    source: &Source,
    cache_dir: Option<&Path>,
    error_limit: usize,
) -> Result<DomainSet> {
    let (data, from_cache) = read_source(source, cache_dir).await?;

    let (set, _) = parse_list(
        &data,
        ParseOptions {
            list_id: &source.id,
            error_limit,
        },
    );

    if !from_cache && is_url(&source.location) {
        if let Some(dir) = cache_dir {
            if let Err(e) = write_cache(dir, source, &data) {
                warn!(list = %source.id, error = %e, "failed to write cache");
            }
        }
    }

    Ok(set)
}

async fn read_source(source: &Source, cache_dir: Option<&Path>) -> Result<(String, bool)> {
    if is_url(&source.location) {
        match download(source).await {
            Ok(data) => return Ok((data, false)),
            Err(e) => {
                let Some(dir) = cache_dir else {
                    return Err(e);
                };
                let cached = read_cache(dir, source).map_err(|cache_err| {
                    Error::Filtering(format!(
                        "download failed: {}; cache error: {}",
                        e, cache_err
                    ))
                })?;
                warn!(list = %source.id, error = %e, "download failed, using cached list");
                return Ok((cached, true));
            }
        }
    }

    let data = std::fs::read_to_string(&source.location)
        .map_err(|e| Error::Filtering(format!("read file: {}", e)))?;
    Ok((data, false))
}

async fn download(source: &Source) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::Filtering(format!("http client: {}", e)))?;

    let mut request = client.get(&source.location);
    request = apply_auth(request, &source.auth);

    let response = request
        .send()
        .await
        .map_err(|e| Error::Filtering(format!("fetch {}: {}", source.location, e)))?;

    if !response.status().is_success() {
        return Err(Error::Filtering(format!(
            "unexpected status {}",
            response.status().as_u16()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| Error::Filtering(format!("read body: {}", e)))
}

fn apply_auth(request: reqwest::RequestBuilder, auth: &AuthConfig) -> reqwest::RequestBuilder {
    let mut request = request;
    if !auth.username.is_empty() || !auth.password.is_empty() {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }
    if !auth.token.is_empty() {
        let header = if auth.header.is_empty() {
            "Authorization"
        } else {
            auth.header.as_str()
        };
        let scheme = if auth.scheme.is_empty() {
            "Bearer"
        } else {
            auth.scheme.as_str()
        };
        request = request.header(header, format!("{} {}", scheme, auth.token).trim().to_string());
    }
    request
}

fn write_cache(cache_dir: &Path, source: &Source, data: &str) -> std::io::Result<()> {
    use std::io::Write;

    let path = cache_dir.join(cache_file_name(source));
    let mut file = open_cache_file(&path)?;
    file.write_all(data.as_bytes())
}

#[cfg(unix)]
fn open_cache_file(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_cache_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn read_cache(cache_dir: &Path, source: &Source) -> std::io::Result<String> {
    std::fs::read_to_string(cache_dir.join(cache_file_name(source)))
}

fn cache_file_name(source: &Source) -> String {
    let id = sanitize_id(&source.id);
    if id.is_empty() {
        let digest = Sha256::digest(source.location.as_bytes());
        return format!("custom-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}.txt",
            digest[0], digest[1], digest[2], digest[3],
            digest[4], digest[5], digest[6], digest[7]);
    }
    format!("{}.txt", id)
}

/// Lowercase the id, keep `[a-z0-9]`, replace everything else with `_`.
fn sanitize_id(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
