use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::registry::IntervalPlan;
use crate::symbol::{SymbolFormat, format_symbol, resolve_symbol};
use candela_types::{CandelaError, Candle, DataSource, Exchange, TimeFrame};

/// One page-agnostic fetch of raw candles from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Provider and market.
    pub source: DataSource,
    /// Caller-supplied asset, bare (`BTC`) or compound (`BTC-USDT`).
    pub asset: String,
    /// Quote leg used when `asset` is bare.
    pub quote: String,
    /// Inclusive range start, epoch milliseconds.
    pub start_ms: i64,
    /// Exclusive range end, epoch milliseconds.
    pub end_ms: i64,
    /// Provider-native interval code.
    pub interval: &'static str,
    /// Label stamped on every returned candle.
    pub interval_label: String,
    /// Width of one returned candle in milliseconds.
    pub base_interval_ms: i64,
}

impl FetchRequest {
    /// Build a request for the base interval of `plan` over `[start_ms, end_ms)`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the asset is blank or the range is empty.
    pub fn from_plan(
        source: DataSource,
        asset: impl Into<String>,
        quote: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
        plan: &IntervalPlan,
    ) -> Result<Self, CandelaError> {
        let asset = asset.into();
        if asset.trim().is_empty() {
            return Err(CandelaError::InvalidArg("asset must not be empty".into()));
        }
        if end_ms <= start_ms {
            return Err(CandelaError::InvalidArg(format!(
                "empty fetch range [{start_ms}, {end_ms})"
            )));
        }
        Ok(Self {
            source,
            asset,
            quote: quote.into(),
            start_ms,
            end_ms,
            interval: plan.provider_interval,
            interval_label: plan.base_timeframe.label().to_string(),
            base_interval_ms: plan.base_interval_ms(),
        })
    }

    /// Shortcut for a native timeframe without consulting the registry.
    #[must_use]
    pub fn native(
        source: DataSource,
        asset: impl Into<String>,
        quote: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
        interval: &'static str,
        timeframe: TimeFrame,
    ) -> Self {
        Self {
            source,
            asset: asset.into(),
            quote: quote.into(),
            start_ms,
            end_ms,
            interval,
            interval_label: timeframe.label().to_string(),
            base_interval_ms: timeframe.duration_ms(),
        }
    }

    /// Canonical `BASE-QUOTE` symbol stamped on produced candles.
    #[must_use]
    pub fn display_symbol(&self) -> String {
        resolve_symbol(&self.asset, &self.quote, "-")
    }

    /// Provider spelling of the pair.
    #[must_use]
    pub fn symbol(&self, format: &SymbolFormat) -> String {
        format_symbol(&self.asset, &self.quote, format)
    }
}

/// Capability implemented by every provider adapter.
///
/// Implementations return a flat, unclipped, possibly unsorted and overlapping candle list in the
/// uniform schema. Cleanup (number parsing, fallback `end = start + base_interval_ms`) happens
/// inside the adapter. The token must be checked before each page request.
#[async_trait]
pub trait CandleFetcher: Send + Sync {
    /// Exchange this adapter talks to.
    fn exchange(&self) -> Exchange;

    /// Fetch raw candles covering `[req.start_ms, req.end_ms)`.
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError>;
}

/// Returns `Err(Cancelled)` when the token has fired.
///
/// # Errors
/// `CandelaError::Cancelled` when `cancel` is cancelled.
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), CandelaError> {
    if cancel.is_cancelled() {
        Err(CandelaError::Cancelled)
    } else {
        Ok(())
    }
}

/// Interchangeable provider adapters keyed by exchange.
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<Exchange, Arc<dyn CandleFetcher>>,
}

impl FetcherRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fetcher` under its own exchange, replacing any previous adapter.
    pub fn register(&mut self, fetcher: Arc<dyn CandleFetcher>) -> Option<Arc<dyn CandleFetcher>> {
        self.fetchers.insert(fetcher.exchange(), fetcher)
    }

    /// Adapter for `exchange`, if any.
    #[must_use]
    pub fn get(&self, exchange: Exchange) -> Option<&Arc<dyn CandleFetcher>> {
        self.fetchers.get(&exchange)
    }

    /// Registered exchanges, in `Exchange` order.
    #[must_use]
    pub fn exchanges(&self) -> Vec<Exchange> {
        let mut out: Vec<Exchange> = self.fetchers.keys().copied().collect();
        out.sort();
        out
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }
}

impl std::fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherRegistry")
            .field("exchanges", &self.exchanges())
            .finish()
    }
}

impl FromIterator<Arc<dyn CandleFetcher>> for FetcherRegistry {
    fn from_iter<T: IntoIterator<Item = Arc<dyn CandleFetcher>>>(iter: T) -> Self {
        let mut registry = Self::new();
        for f in iter {
            registry.register(f);
        }
        registry
    }
}
