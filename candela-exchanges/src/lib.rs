//! candela-exchanges
//!
//! HTTP source fetchers implementing `candela_core::CandleFetcher` for ten providers:
//! Binance, Bybit, OKX, KuCoin, Gate.io, Coinbase (spot only), Kraken, Bitget, HTX and MEXC.
//!
//! Every fetcher turns one `FetchRequest` into raw candles by paging through the provider's
//! cursor scheme, converting units to epoch milliseconds and coercing numeric fields. Fetchers
//! share one `reqwest::Client`; build them all at once with [`default_fetchers`].
#![warn(missing_docs)]

mod http;
mod paging;
mod parse;

/// Binance spot and USDⓈ-M futures.
pub mod binance;
/// Bitget v2 spot and mix.
pub mod bitget;
/// Bybit v5.
pub mod bybit;
/// Coinbase Exchange.
pub mod coinbase;
/// Gate.io v4.
pub mod gateio;
/// HTX spot and linear swaps.
pub mod htx;
/// Kraken spot and Kraken Futures.
pub mod kraken;
/// KuCoin spot and futures.
pub mod kucoin;
/// MEXC spot and contract.
pub mod mexc;
/// OKX v5.
pub mod okx;

use std::sync::Arc;

pub use binance::BinanceFetcher;
pub use bitget::BitgetFetcher;
pub use bybit::BybitFetcher;
pub use coinbase::CoinbaseFetcher;
pub use gateio::GateioFetcher;
pub use htx::HtxFetcher;
pub use http::build_client;
pub use kraken::KrakenFetcher;
pub use kucoin::KucoinFetcher;
pub use mexc::MexcFetcher;
pub use okx::OkxFetcher;

use candela_core::{CandelaError, CandleFetcher, Exchange, FetcherRegistry, LoaderConfig};

/// Production fetcher for `exchange` on `client`.
#[must_use]
pub fn fetcher_for(exchange: Exchange, client: reqwest::Client) -> Arc<dyn CandleFetcher> {
    match exchange {
        Exchange::Binance => Arc::new(BinanceFetcher::new(client)),
        Exchange::Bybit => Arc::new(BybitFetcher::new(client)),
        Exchange::Okx => Arc::new(OkxFetcher::new(client)),
        Exchange::Kucoin => Arc::new(KucoinFetcher::new(client)),
        Exchange::Gateio => Arc::new(GateioFetcher::new(client)),
        Exchange::Coinbase => Arc::new(CoinbaseFetcher::new(client)),
        Exchange::Kraken => Arc::new(KrakenFetcher::new(client)),
        Exchange::Bitget => Arc::new(BitgetFetcher::new(client)),
        Exchange::Htx => Arc::new(HtxFetcher::new(client)),
        Exchange::Mexc => Arc::new(MexcFetcher::new(client)),
    }
}

/// Registry holding all ten production fetchers on one shared client.
///
/// # Errors
/// Returns `Transport` if the HTTP client cannot be built.
pub fn default_fetchers(config: &LoaderConfig) -> Result<FetcherRegistry, CandelaError> {
    let client = build_client(config)?;
    Ok(Exchange::ALL
        .into_iter()
        .map(|e| fetcher_for(e, client.clone()))
        .collect())
}
