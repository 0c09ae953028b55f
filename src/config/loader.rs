//! Configuration loading: file resolution, TOML parsing, per-list table
//! extraction, and duration strings.

use std::collections::HashMap;
use std::time::Duration;

use super::{validation, Config, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
use crate::filtering::ListConfig;
use crate::{Error, Result};

/// Load from `RESOLVIT_CONFIG` or the default path.
pub fn load_from_env() -> Result<Config> {
    let path = std::env::var(CONFIG_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    load_from_file(&path)
}

/// Load, resolve, and validate the file at `path`.
pub fn load_from_file(path: &str) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read config {}: {}", path, e)))?;
    load_from_toml(&contents)
}

/// Parse, resolve, and validate a TOML document.
pub fn load_from_toml(contents: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(contents).map_err(|e| Error::Config(format!("parse config: {}", e)))?;

    config.filtering.lists = extract_list_configs(&config.filtering.other)?;
    validation::validate_config(&mut config)?;
    Ok(config)
}

/// Convert the leftover `[filtering.*]` tables into per-list configs.
///
/// Scalar leftovers are unknown keys and rejected; list ids are
/// lowercased like every other domain-adjacent identifier.
fn extract_list_configs(
    other: &HashMap<String, toml::Value>,
) -> Result<HashMap<String, ListConfig>> {
    let mut lists = HashMap::new();

    for (key, value) in other {
        let table = value
            .as_table()
            .ok_or_else(|| Error::Config(format!("filtering.{} must be a table", key)))?;

        let cfg: ListConfig = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e| Error::Config(format!("parse filtering.{}: {}", key, e)))?;

        lists.insert(key.to_lowercase(), cfg);
    }

    Ok(lists)
}

/// Parse a duration string: one or more `<number><unit>` groups with
/// units `ms`, `s`, `m`, or `h` (`90s`, `24h`, `1h30m`). Empty input and
/// `0` mean zero.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut number = String::new();
    let mut unit = String::new();

    let flush = |number: &mut String, unit: &mut String, total: &mut Duration| -> Result<()> {
        if number.is_empty() || unit.is_empty() {
            return Err(Error::Config(format!("invalid duration: {:?}", raw)));
        }
        let value: u64 = number
            .parse()
            .map_err(|_| Error::Config(format!("invalid duration: {:?}", raw)))?;
        let step = match unit.as_str() {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            _ => return Err(Error::Config(format!("invalid duration unit: {:?}", unit))),
        };
        *total += step;
        number.clear();
        unit.clear();
        Ok(())
    };

    for c in raw.chars() {
        if c.is_ascii_digit() {
            if !unit.is_empty() {
                flush(&mut number, &mut unit, &mut total)?;
            }
            number.push(c);
        } else if c.is_ascii_alphabetic() {
            if number.is_empty() {
                return Err(Error::Config(format!("invalid duration: {:?}", raw)));
            }
            unit.push(c);
        } else {
            return Err(Error::Config(format!("invalid duration: {:?}", raw)));
        }
    }
    flush(&mut number, &mut unit, &mut total)?;

    Ok(total)
}
