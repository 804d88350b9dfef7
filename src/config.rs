//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::query::QueryClientOptions;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4200/api";
pub const DEFAULT_STALE_TIME_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub stale_time: Duration,
    pub timeouts: ApiTimeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `PREFECT_API_URL`: default `http://127.0.0.1:4200/api`
    /// - `BLOCKS_STALE_TIME_MS`: default 1000
    /// - `BLOCKS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BLOCKS_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("PREFECT_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let stale_ms = parse_or(&lookup, "BLOCKS_STALE_TIME_MS", DEFAULT_STALE_TIME_MS);
        let timeouts = ApiTimeouts {
            request_secs: parse_or(&lookup, "BLOCKS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "BLOCKS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Self {
            api_url: api_url.trim().trim_end_matches('/').to_owned(),
            stale_time: Duration::from_millis(stale_ms),
            timeouts,
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        api_url.trim().trim_end_matches('/').clone_into(&mut self.api_url);
        self
    }

    #[must_use]
    pub fn query_options(&self) -> QueryClientOptions {
        QueryClientOptions { stale_time: self.stale_time }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
