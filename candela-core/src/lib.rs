//! candela-core
//!
//! Core building blocks shared by the candela fetchers and the loader.
//!
//! - `registry`: static per-provider interval vocabularies and the interval resolver.
//! - `symbol`: exchange-specific symbol formatting.
//! - `fetcher`: the `CandleFetcher` adapter trait and the `FetcherRegistry` keyed by exchange.
//! - `timeseries`: range normalization, OHLCV aggregation and gap detection.
//! - `cache`: the per-timeframe, single-owner candle cache.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Cancellation is expressed with `tokio_util::sync::CancellationToken` and the cache guards its
//! maps with `tokio::sync::Mutex`, so callers must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Single-owner-per-timeframe candle cache.
pub mod cache;
/// Adapter trait implemented by every provider fetcher.
pub mod fetcher;
/// Provider interval tables and the interval resolver.
pub mod registry;
/// Exchange-specific symbol formatting.
pub mod symbol;
/// Time-series utilities for normalizing, aggregating and scanning candles.
pub mod timeseries;

pub use cache::{CandleCache, TimeframeCache};
pub use fetcher::{CandleFetcher, FetchRequest, FetcherRegistry, ensure_not_cancelled};
pub use registry::{
    IntervalCode, IntervalPlan, interval_map, is_timeframe_supported, resolve, resolve_in,
    resolve_or_err, supported_timeframes,
};
pub use symbol::{SymbolFormat, format_symbol, resolve_symbol, split_symbol};
pub use timeseries::aggregate::aggregate;
pub use timeseries::gaps::{Gap, GapScan, align_range, scan_gaps};
pub use timeseries::normalize::normalize;

pub use candela_types::{
    CandelaError, Candle, DataSource, Exchange, LoaderConfig, MarketType, TimeFrame,
};
pub use tokio_util::sync::CancellationToken;
