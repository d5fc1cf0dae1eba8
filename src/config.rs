use std::env;
use std::time::Duration;

use crate::models::Chain;

pub const DEFAULT_MORALIS_API_BASE: &str = "https://deep-index.moralis.io/api/v2";

/// Process-wide configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Indexer credential. `None` makes every holdings request fail with a configuration error.
    pub moralis_api_key: Option<String>,
    pub moralis_api_base: String,
    pub default_chain: Chain,
    pub metadata_timeout: Duration,
    pub upstream_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
            moralis_api_key: None,
            moralis_api_base: DEFAULT_MORALIS_API_BASE.to_string(),
            default_chain: Chain::Base,
            metadata_timeout: Duration::from_secs(5),
            upstream_timeout: Duration::from_secs(15),
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment (call `dotenv()` first)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("⚠️  Invalid PORT '{}', using {}", raw, defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        let default_chain = match get("DEFAULT_CHAIN") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("⚠️  {}, using {}", e, defaults.default_chain);
                defaults.default_chain
            }),
            None => defaults.default_chain,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            moralis_api_key: get("MORALIS_API_KEY"),
            moralis_api_base: get("MORALIS_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.moralis_api_base),
            default_chain,
            metadata_timeout: seconds(get("METADATA_TIMEOUT_SECS"), "METADATA_TIMEOUT_SECS")
                .unwrap_or(defaults.metadata_timeout),
            upstream_timeout: seconds(get("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            cors_allowed_origins,
        }
    }
}

fn seconds(raw: Option<String>, key: &str) -> Option<Duration> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            log::warn!("⚠️  Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
