use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use serde_json::Value;

use crate::http::http_fetcher;
use crate::paging::backward_windows;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SYMBOL: SymbolFormat = SymbolFormat::joined("-");

http_fetcher! {
    /// Coinbase Exchange product candles. Spot only.
    ///
    /// Walks backward in windows of at most 300 buckets with ISO-8601 `start`/`end`.
    CoinbaseFetcher {
        exchange: Exchange::Coinbase,
        spot: "https://api.exchange.coinbase.com",
        futures: "https://api.exchange.coinbase.com",
        page_limit: 300,
    }
}

fn iso(ms: i64) -> Result<String, CandelaError> {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| CandelaError::InvalidArg(format!("timestamp out of range: {ms}")))
}

/// Rows `[time(s), low, high, open, close, volume]`.
fn bar(row: &[Value]) -> Bar {
    Bar {
        start: parse::int(row.first()).and_then(|s| s.checked_mul(1000)),
        low: parse::num(row.get(1)),
        high: parse::num(row.get(2)),
        open: parse::num(row.get(3)),
        close: parse::num(row.get(4)),
        volume: parse::num(row.get(5)),
        ..Bar::default()
    }
}

#[async_trait]
impl CandleFetcher for CoinbaseFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Coinbase
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::coinbase::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        if req.source.market_type != MarketType::Spot {
            return Err(CandelaError::unsupported_source(
                Exchange::Coinbase.as_str(),
                req.source.market_type.as_str(),
            ));
        }
        let product = req.symbol(&SYMBOL);
        let url = self
            .http
            .url(MarketType::Spot, &format!("/products/{product}/candles"));
        let http = &self.http;
        let url = url.as_str();

        backward_windows(req, http.page_limit(), cancel, |from, to| async move {
            let query = [
                ("granularity", req.interval.to_string()),
                ("start", iso(from)?),
                ("end", iso(to - 1)?),
            ];
            let rows: Vec<Vec<Value>> = http.get_json(url, &query, cancel).await?;
            Ok(parse::collect(req, rows.iter().map(|r| bar(r))))
        })
        .await
    }
}
