use std::path::PathBuf;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::{load, API_KEY_ENV};
pub use validator::validate_config;

/// Built-in shared demo credential, used whenever no user key is stored.
pub const DEFAULT_API_KEY: &str = "demo";
pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Upstream endpoint layout and the fallback credential.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub quote_path: String,
    pub search_path: String,
    pub default_key: String,
    /// `None` leaves timeouts to the transport.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub quote_ttl: Duration,
    pub search_ttl: Duration,
    pub history_ttl: Duration,
}

/// Client-side approximation of the upstream free-tier rate limit.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    pub per_minute_limit: u32,
    pub warning_threshold: u32,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub size: usize,
    pub pause: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub key_file: PathBuf,
    pub key_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub quota: QuotaConfig,
    pub batch: BatchConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            api: ApiConfig {
                base_url: FINNHUB_BASE_URL.to_string(),
                quote_path: "/quote".to_string(),
                search_path: "/search".to_string(),
                default_key: DEFAULT_API_KEY.to_string(),
                timeout: None,
            },
            cache: CacheConfig {
                quote_ttl: Duration::from_secs(60),
                search_ttl: Duration::from_secs(300),
                history_ttl: Duration::from_secs(3600),
            },
            quota: QuotaConfig {
                per_minute_limit: 60,
                warning_threshold: 5,
            },
            batch: BatchConfig {
                size: 5,
                pause: Duration::from_millis(1000),
            },
            storage: StorageConfig {
                key_file: PathBuf::from("data").join("credentials.json"),
                key_name: "finnhub_api_key".to_string(),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
