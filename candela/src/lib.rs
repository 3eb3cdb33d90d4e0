//! candela loads historical OHLCV candles from ten crypto exchanges, caches them per timeframe
//! and fills only what is missing.
//!
//! Overview
//! - `CandleLoader::load_candles` pads the requested range, aligns it to the bucket grid, scans
//!   the cache for gaps and fetches each gap from the provider's REST API.
//! - Timeframes a provider lacks natively are built by aggregating the largest native timeframe
//!   that divides them evenly (e.g. 2h from 1h on Gate.io).
//! - The cache keeps one owner asset per timeframe: loading another asset on the same
//!   timeframe discards the previous asset's candles.
//! - Every call accepts a `CancellationToken`; a superseded load resolves to
//!   `CandelaError::Cancelled` and keeps the gaps it already completed.
//!
//! Example
//! ```rust,ignore
//! use candela::{CandleLoader, DataSource, Exchange, LoadRequest, TimeFrame};
//!
//! let loader = CandleLoader::builder().with_default_fetchers()?.build()?;
//! let req = LoadRequest::new(
//!     DataSource::spot(Exchange::Binance),
//!     TimeFrame::Hour1,
//!     start_ms,
//!     end_ms,
//!     "BTC",
//! );
//! let candles = loader.load_candles(&req, None, None).await?;
//! ```
#![warn(missing_docs)]

mod core;
mod loader;

pub use crate::core::{CandleLoader, CandleLoaderBuilder, Clock};
pub use crate::loader::{LoadRequest, SnapshotFn};

pub use candela_core::{
    CancellationToken, CandelaError, Candle, CandleCache, CandleFetcher, DataSource, Exchange,
    FetcherRegistry, IntervalPlan, LoaderConfig, MarketType, TimeFrame, is_timeframe_supported,
    resolve, supported_timeframes,
};
pub use candela_exchanges::{build_client, default_fetchers, fetcher_for};
