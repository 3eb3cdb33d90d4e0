//! Configuration shared by the loader and the HTTP fetchers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Global configuration for the candle loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Buckets fetched on each side of the requested range to absorb small chart pans.
    pub prefetch_buckets: i64,
    /// Trailing window loaded when the requested range is degenerate.
    pub default_window: Duration,
    /// Quote asset used when the caller does not pass one.
    pub default_quote: String,
    /// Timeout applied to every individual HTTP request.
    pub http_timeout: Duration,
    /// User agent sent by the HTTP fetchers.
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            prefetch_buckets: 200,
            default_window: Duration::from_secs(30 * 24 * 60 * 60),
            default_quote: "USDT".to_string(),
            http_timeout: Duration::from_secs(15),
            user_agent: concat!("candela/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    /// Default window in epoch milliseconds.
    #[must_use]
    pub fn default_window_ms(&self) -> i64 {
        i64::try_from(self.default_window.as_millis()).unwrap_or(i64::MAX)
    }
}
