use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::http::{Http, http_fetcher};
use crate::paging::{backward_pages, forward_windows};
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SPOT: SymbolFormat = SymbolFormat::joined("-");
const FUTURES: SymbolFormat = SymbolFormat::joined("").suffix("M").aliases(&[("BTC", "XBT")]);
const OK: &str = "200000";

http_fetcher! {
    /// KuCoin spot (`/api/v1/market/candles`) and futures (`/api/v1/kline/query`).
    ///
    /// Spot pages backward with `endAt` in seconds; futures walks forward in fixed windows
    /// with millisecond `from`/`to`.
    KucoinFetcher {
        exchange: Exchange::Kucoin,
        spot: "https://api.kucoin.com",
        futures: "https://api-futures.kucoin.com",
        page_limit: 1500,
    }
}

/// Futures answers at most 500 rows regardless of the spot page size.
const FUTURES_LIMIT: usize = 500;

#[derive(Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

async fn get_rows(
    http: &Http,
    url: &str,
    query: &[(&str, String)],
    cancel: &CancellationToken,
) -> Result<Vec<Vec<Value>>, CandelaError> {
    let env: Envelope = http.get_json(url, query, cancel).await?;
    if env.code != OK {
        return Err(CandelaError::provider(http.provider(), env.code, env.msg));
    }
    Ok(env.data)
}

/// Spot rows `[time(s), open, close, high, low, volume, turnover]`.
fn spot_bar(row: &[Value]) -> Bar {
    Bar {
        start: parse::int(row.first()).and_then(|s| s.checked_mul(1000)),
        open: parse::num(row.get(1)),
        close: parse::num(row.get(2)),
        high: parse::num(row.get(3)),
        low: parse::num(row.get(4)),
        volume: parse::num(row.get(5)),
        ..Bar::default()
    }
}

impl KucoinFetcher {
    async fn fetch_spot(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let url = self.http.url(MarketType::Spot, "/api/v1/market/candles");
        let symbol = req.symbol(&SPOT);
        let http = &self.http;
        let (url, symbol) = (url.as_str(), symbol.as_str());

        backward_pages(req, http.page_limit(), cancel, |cursor| async move {
            let query = [
                ("symbol", symbol.to_string()),
                ("type", req.interval.to_string()),
                ("startAt", req.start_ms.div_euclid(1000).to_string()),
                ("endAt", cursor.div_euclid(1000).to_string()),
            ];
            let rows = get_rows(http, url, &query, cancel).await?;
            Ok(parse::collect(req, rows.iter().map(|r| spot_bar(r))))
        })
        .await
    }

    async fn fetch_futures(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let url = self.http.url(MarketType::Futures, "/api/v1/kline/query");
        let symbol = req.symbol(&FUTURES);
        let http = &self.http;
        let (url, symbol) = (url.as_str(), symbol.as_str());
        let limit = http.page_limit().min(FUTURES_LIMIT);

        forward_windows(req, limit, cancel, |from, to| async move {
            let query = [
                ("symbol", symbol.to_string()),
                ("granularity", req.interval.to_string()),
                ("from", from.to_string()),
                ("to", (to - 1).to_string()),
            ];
            let rows = get_rows(http, url, &query, cancel).await?;
            Ok(parse::collect(req, rows.iter().map(|r| Bar::tohlcv(r))))
        })
        .await
    }
}

#[async_trait]
impl CandleFetcher for KucoinFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Kucoin
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::kucoin::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        match req.source.market_type {
            MarketType::Spot => self.fetch_spot(req, cancel).await,
            MarketType::Futures => self.fetch_futures(req, cancel).await,
        }
    }
}
