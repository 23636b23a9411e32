use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

use super::{validator, Config};

/// Environment variable that replaces the built-in default credential.
pub const API_KEY_ENV: &str = "TICKER_BOARD_API_KEY";

/// Build the effective configuration: builtin defaults, then the optional JSON file, then the
/// environment. The result is validated before it is returned.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) if path.exists() => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file at {}", path.display()))?;
            parse_config(&json).map_err(|err| {
                AppError::message(format!(
                    "failed to parse config file at {}: {}",
                    path.display(),
                    err
                ))
            })?
        }
        Some(path) => {
            log::debug!(
                "Config file {} not found, using builtin defaults",
                path.display()
            );
            Config::builtin()
        }
        None => Config::builtin(),
    };

    if let Ok(value) = std::env::var(API_KEY_ENV) {
        let value = value.trim();
        if !value.is_empty() {
            config.api.default_key = value.to_string();
        }
    }

    validator::validate_config(&config)?;
    Ok(config)
}

fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)?;
    let mut config = Config::builtin();
    raw.apply(&mut config);
    Ok(config)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api: RawApi,
    cache: RawCache,
    quota: RawQuota,
    batch: RawBatch,
    storage: RawStorage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApi {
    base_url: Option<String>,
    quote_path: Option<String>,
    search_path: Option<String>,
    default_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCache {
    quote_ttl_secs: Option<u64>,
    search_ttl_secs: Option<u64>,
    history_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawQuota {
    per_minute_limit: Option<u32>,
    warning_threshold: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBatch {
    size: Option<usize>,
    pause_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    key_file: Option<PathBuf>,
    key_name: Option<String>,
}

impl RawConfig {
    fn apply(self, config: &mut Config) {
        let RawConfig {
            api,
            cache,
            quota,
            batch,
            storage,
        } = self;

        if let Some(base_url) = api.base_url {
            config.api.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(path) = api.quote_path {
            config.api.quote_path = path;
        }
        if let Some(path) = api.search_path {
            config.api.search_path = path;
        }
        if let Some(key) = api.default_key {
            config.api.default_key = key;
        }
        if let Some(secs) = api.timeout_secs {
            config.api.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(secs) = cache.quote_ttl_secs {
            config.cache.quote_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = cache.search_ttl_secs {
            config.cache.search_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = cache.history_ttl_secs {
            config.cache.history_ttl = Duration::from_secs(secs);
        }

        if let Some(limit) = quota.per_minute_limit {
            config.quota.per_minute_limit = limit;
        }
        if let Some(threshold) = quota.warning_threshold {
            config.quota.warning_threshold = threshold;
        }

        if let Some(size) = batch.size {
            config.batch.size = size;
        }
        if let Some(ms) = batch.pause_ms {
            config.batch.pause = Duration::from_millis(ms);
        }

        if let Some(file) = storage.key_file {
            config.storage.key_file = file;
        }
        if let Some(name) = storage.key_name {
            config.storage.key_name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_keeps_builtin_defaults() {
        let config = parse_config("{}").expect("parse empty config");
        assert_eq!(config.api.base_url, super::super::FINNHUB_BASE_URL);
        assert_eq!(config.cache.quote_ttl, Duration::from_secs(60));
        assert_eq!(config.cache.search_ttl, Duration::from_secs(300));
        assert_eq!(config.cache.history_ttl, Duration::from_secs(3600));
        assert_eq!(config.quota.per_minute_limit, 60);
        assert_eq!(config.batch.size, 5);
    }

    #[test]
    fn overrides_selected_fields() {
        let json = r#"{
            "api": { "base_url": "http://localhost:8080/", "timeout_secs": 5 },
            "cache": { "quote_ttl_secs": 10 },
            "batch": { "size": 2, "pause_ms": 0 },
            "storage": { "key_file": "tmp/key.json" }
        }"#;

        let config = parse_config(json).expect("parse config");
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.cache.quote_ttl, Duration::from_secs(10));
        assert_eq!(config.cache.search_ttl, Duration::from_secs(300));
        assert_eq!(config.batch.size, 2);
        assert_eq!(config.batch.pause, Duration::ZERO);
        assert_eq!(config.storage.key_file, PathBuf::from("tmp/key.json"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let path = std::env::temp_dir().join("ticker-board-missing-config.json");
        let _ = fs::remove_file(&path);
        let config = load(Some(&path)).expect("load without file");
        assert_eq!(config.quota.warning_threshold, 5);
    }
}
