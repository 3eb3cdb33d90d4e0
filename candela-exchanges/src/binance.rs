use async_trait::async_trait;
use serde_json::Value;

use crate::http::{Http, http_fetcher};
use crate::paging::forward_pages;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SYMBOL: SymbolFormat = SymbolFormat::joined("");

http_fetcher! {
    /// Binance spot (`/api/v3/klines`) and USDⓈ-M futures (`/fapi/v1/klines`).
    ///
    /// Pages forward from `startTime`; rows carry an explicit close time.
    BinanceFetcher {
        exchange: Exchange::Binance,
        spot: "https://api.binance.com",
        futures: "https://fapi.binance.com",
        page_limit: 1000,
    }
}

/// Rows `[openTime, o, h, l, c, v, closeTime, quoteVolume, trades, ...]`.
pub(crate) fn kline_bar(row: &[Value]) -> Bar {
    Bar {
        end: parse::int(row.get(6)).map(|t| t + 1),
        trades: parse::count(row.get(8)),
        ..Bar::tohlcv(row)
    }
}

/// Forward `startTime`/`endTime` paging over a Binance-compatible klines endpoint.
pub(crate) async fn fetch_klines(
    http: &Http,
    url: &str,
    symbol: &str,
    req: &FetchRequest,
    cancel: &CancellationToken,
) -> Result<Vec<Candle>, CandelaError> {
    let limit = http.page_limit();
    forward_pages(req, limit, cancel, |cursor| async move {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", req.interval.to_string()),
            ("startTime", cursor.to_string()),
            ("endTime", (req.end_ms - 1).to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<Vec<Value>> = http.get_json(url, &query, cancel).await?;
        Ok(parse::collect(req, rows.iter().map(|r| kline_bar(r))))
    })
    .await
}

#[async_trait]
impl CandleFetcher for BinanceFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::binance::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let path = match req.source.market_type {
            MarketType::Spot => "/api/v3/klines",
            MarketType::Futures => "/fapi/v1/klines",
        };
        let url = self.http.url(req.source.market_type, path);
        let symbol = req.symbol(&SYMBOL);
        fetch_klines(&self.http, &url, &symbol, req, cancel).await
    }
}
