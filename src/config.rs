use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_AMAP_BASE: &str = "https://restapi.amap.com";
pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoints shared by every provider client.
///
/// Built once at startup and handed to each client constructor by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Web-service key sent with every AMap request.
    pub amap_api_key: String,
    /// Bearer token for TMDB.
    pub tmdb_token: String,
    /// Mapping key. Loaded for completeness; no request consumes it.
    pub amap_key: Option<String>,
    /// Security key paired with the mapping key; no request consumes it.
    pub amap_security_key: Option<String>,
    pub amap_base_url: String,
    pub tmdb_base_url: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let amap_api_key = required("AMAP_API_KEY")?;
        let tmdb_token = required("TMDB_TOKEN")?;
        let http_timeout = match optional("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number of seconds, got '{raw}'"))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            amap_api_key,
            tmdb_token,
            amap_key: optional("AMAP_KEY"),
            amap_security_key: optional("AMAP_SECURITY_KEY"),
            amap_base_url: optional("AMAP_BASE_URL").unwrap_or_else(|| DEFAULT_AMAP_BASE.to_string()),
            tmdb_base_url: optional("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string()),
            http_timeout,
        })
    }

    /// Config pointing both providers at the given base URLs, with dummy credentials.
    pub fn for_endpoints(amap_base_url: &str, tmdb_base_url: &str) -> Self {
        Self {
            amap_api_key: "test-amap-key".to_string(),
            tmdb_token: "test-tmdb-token".to_string(),
            amap_key: None,
            amap_security_key: None,
            amap_base_url: amap_base_url.trim_end_matches('/').to_string(),
            tmdb_base_url: tmdb_base_url.trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(5),
        }
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("Missing required environment variable: {key}"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        // Env mutation is process-wide; this is the only test touching these keys.
        env::set_var("AMAP_API_KEY", "amap");
        env::set_var("TMDB_TOKEN", "token");
        env::remove_var("AMAP_KEY");
        env::remove_var("AMAP_SECURITY_KEY");
        env::remove_var("AMAP_BASE_URL");
        env::remove_var("TMDB_BASE_URL");
        env::remove_var("HTTP_TIMEOUT_SECS");

        let config = AppConfig::from_env().expect("config");
        assert_eq!(config.amap_api_key, "amap");
        assert_eq!(config.tmdb_token, "token");
        assert_eq!(config.amap_key, None);
        assert_eq!(config.amap_base_url, DEFAULT_AMAP_BASE);
        assert_eq!(config.tmdb_base_url, DEFAULT_TMDB_BASE);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn for_endpoints_strips_trailing_slash() {
        let config = AppConfig::for_endpoints("http://127.0.0.1:1/", "http://127.0.0.1:2/3/");
        assert_eq!(config.amap_base_url, "http://127.0.0.1:1");
        assert_eq!(config.tmdb_base_url, "http://127.0.0.1:2/3");
    }
}
