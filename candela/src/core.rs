use std::sync::Arc;

use candela_core::{CandelaError, CandleCache, CandleFetcher, FetcherRegistry, LoaderConfig};

/// Source of the current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

/// Gap-filling candle loader over a shared cache and a registry of fetchers.
pub struct CandleLoader {
    pub(crate) fetchers: FetcherRegistry,
    pub(crate) cache: Arc<CandleCache>,
    pub(crate) cfg: LoaderConfig,
    pub(crate) clock: Clock,
}

impl std::fmt::Debug for CandleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleLoader")
            .field("fetchers", &self.fetchers)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`CandleLoader`].
pub struct CandleLoaderBuilder {
    fetchers: FetcherRegistry,
    cache: Option<Arc<CandleCache>>,
    cfg: LoaderConfig,
    clock: Option<Clock>,
}

impl Default for CandleLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleLoaderBuilder {
    /// Create a builder with default configuration and no fetchers.
    ///
    /// At least one fetcher must be registered, either one by one with [`with_fetcher`] or all
    /// ten production fetchers with [`with_default_fetchers`].
    ///
    /// [`with_fetcher`]: Self::with_fetcher
    /// [`with_default_fetchers`]: Self::with_default_fetchers
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetchers: FetcherRegistry::new(),
            cache: None,
            cfg: LoaderConfig::default(),
            clock: None,
        }
    }

    /// Replace the configuration.
    ///
    /// Fetchers registered through [`with_default_fetchers`](Self::with_default_fetchers) read
    /// the HTTP settings at registration time, so set the config first.
    #[must_use]
    pub fn config(mut self, cfg: LoaderConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Register a fetcher, replacing any previous one for the same exchange.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn CandleFetcher>) -> Self {
        self.fetchers.register(fetcher);
        self
    }

    /// Register the production HTTP fetcher of every supported exchange.
    ///
    /// # Errors
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn with_default_fetchers(mut self) -> Result<Self, CandelaError> {
        let defaults = candela_exchanges::default_fetchers(&self.cfg)?;
        for exchange in defaults.exchanges() {
            if let Some(f) = defaults.get(exchange) {
                self.fetchers.register(Arc::clone(f));
            }
        }
        Ok(self)
    }

    /// Share an existing cache instead of creating a private one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<CandleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the wall clock used to clamp ranges to "now".
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the loader.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no fetcher is registered or the configuration is unusable.
    pub fn build(self) -> Result<CandleLoader, CandelaError> {
        if self.fetchers.is_empty() {
            return Err(CandelaError::InvalidArg(
                "no fetchers registered; add at least one via with_fetcher(...)".to_string(),
            ));
        }
        if self.cfg.prefetch_buckets < 0 {
            return Err(CandelaError::InvalidArg(
                "prefetch_buckets must not be negative".to_string(),
            ));
        }
        if self.cfg.default_window.is_zero() {
            return Err(CandelaError::InvalidArg(
                "default_window must be positive".to_string(),
            ));
        }
        Ok(CandleLoader {
            fetchers: self.fetchers,
            cache: self.cache.unwrap_or_default(),
            cfg: self.cfg,
            clock: self.clock.unwrap_or_else(system_clock),
        })
    }
}

impl CandleLoader {
    /// Start building a loader.
    #[must_use]
    pub fn builder() -> CandleLoaderBuilder {
        CandleLoaderBuilder::new()
    }

    /// Shared cache backing this loader.
    #[must_use]
    pub fn cache(&self) -> &Arc<CandleCache> {
        &self.cache
    }

    /// Registered fetchers.
    #[must_use]
    pub const fn fetchers(&self) -> &FetcherRegistry {
        &self.fetchers
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &LoaderConfig {
        &self.cfg
    }

    /// Drop every cached candle and owner.
    pub async fn clear_cache(&self) {
        self.cache.clear_cache().await;
    }

    pub(crate) fn now_ms(&self) -> i64 {
        (self.clock)()
    }
}
