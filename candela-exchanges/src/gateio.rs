use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::http::http_fetcher;
use crate::paging::forward_windows;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SYMBOL: SymbolFormat = SymbolFormat::joined("_");

http_fetcher! {
    /// Gate.io v4 spot and USDT-settled futures candlesticks.
    ///
    /// Walks forward in windows of `page_limit` buckets using `from`/`to` in seconds.
    GateioFetcher {
        exchange: Exchange::Gateio,
        spot: "https://api.gateio.ws",
        futures: "https://api.gateio.ws",
        page_limit: 1000,
    }
}

/// Futures rows are objects.
#[derive(Deserialize, Default)]
#[serde(default)]
struct FuturesRow {
    t: Value,
    v: Value,
    o: Value,
    h: Value,
    l: Value,
    c: Value,
}

/// Spot rows `[t(s), quote volume, close, high, low, open, base volume, closed]`.
fn spot_bar(row: &[Value]) -> Bar {
    Bar {
        start: parse::int(row.first()).and_then(|s| s.checked_mul(1000)),
        close: parse::num(row.get(2)),
        high: parse::num(row.get(3)),
        low: parse::num(row.get(4)),
        open: parse::num(row.get(5)),
        volume: parse::num(row.get(6)),
        ..Bar::default()
    }
}

fn futures_bar(row: &FuturesRow) -> Bar {
    Bar {
        start: parse::int(Some(&row.t)).and_then(|s| s.checked_mul(1000)),
        open: parse::num(Some(&row.o)),
        high: parse::num(Some(&row.h)),
        low: parse::num(Some(&row.l)),
        close: parse::num(Some(&row.c)),
        volume: parse::num(Some(&row.v)),
        ..Bar::default()
    }
}

#[async_trait]
impl CandleFetcher for GateioFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Gateio
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::gateio::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let market = req.source.market_type;
        let (path, pair_key) = match market {
            MarketType::Spot => ("/api/v4/spot/candlesticks", "currency_pair"),
            MarketType::Futures => ("/api/v4/futures/usdt/candlesticks", "contract"),
        };
        let url = self.http.url(market, path);
        let pair = req.symbol(&SYMBOL);
        let http = &self.http;
        let (url, pair) = (url.as_str(), pair.as_str());

        forward_windows(req, http.page_limit(), cancel, |from, to| async move {
            // Gate treats `to` as inclusive.
            let query = [
                (pair_key, pair.to_string()),
                ("interval", req.interval.to_string()),
                ("from", from.div_euclid(1000).to_string()),
                ("to", ((to - 1).div_euclid(1000)).to_string()),
            ];
            let page = match market {
                MarketType::Spot => {
                    let rows: Vec<Vec<Value>> = http.get_json(url, &query, cancel).await?;
                    parse::collect(req, rows.iter().map(|r| spot_bar(r)))
                }
                MarketType::Futures => {
                    let rows: Vec<FuturesRow> = http.get_json(url, &query, cancel).await?;
                    parse::collect(req, rows.iter().map(futures_bar))
                }
            };
            Ok(page)
        })
        .await
    }
}
