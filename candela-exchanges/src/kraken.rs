use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::http::http_fetcher;
use crate::paging::advances;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat, ensure_not_cancelled,
};

const XBT: &[(&str, &str)] = &[("BTC", "XBT")];
const SPOT: SymbolFormat = SymbolFormat::joined("").aliases(XBT);
const FUTURES: SymbolFormat = SymbolFormat::joined("")
    .prefix("PF_")
    .aliases(XBT)
    .quote_aliases(&[("USDT", "USD")]);

http_fetcher! {
    /// Kraken spot `OHLC` and Kraken Futures charts.
    ///
    /// Spot pages forward with the `since`/`last` cursor (at most 720 rows per answer).
    /// Futures pages forward with `from` and stops once `more_candles` is false.
    KrakenFetcher {
        exchange: Exchange::Kraken,
        spot: "https://api.kraken.com",
        futures: "https://futures.kraken.com",
        page_limit: 720,
    }
}

#[derive(Deserialize)]
struct SpotEnvelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Map<String, Value>,
}

#[derive(Deserialize)]
struct ChartsEnvelope {
    #[serde(default)]
    candles: Vec<ChartCandle>,
    #[serde(default)]
    more_candles: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChartCandle {
    time: Value,
    open: Value,
    high: Value,
    low: Value,
    close: Value,
    volume: Value,
}

/// Spot rows `[time(s), o, h, l, c, vwap, volume, count]`.
fn spot_bar(row: &[Value]) -> Bar {
    Bar {
        start: parse::int(row.first()).and_then(|s| s.checked_mul(1000)),
        open: parse::num(row.get(1)),
        high: parse::num(row.get(2)),
        low: parse::num(row.get(3)),
        close: parse::num(row.get(4)),
        volume: parse::num(row.get(6)),
        trades: parse::count(row.get(7)),
        ..Bar::default()
    }
}

fn chart_bar(c: &ChartCandle) -> Bar {
    Bar {
        start: parse::int(Some(&c.time)),
        open: parse::num(Some(&c.open)),
        high: parse::num(Some(&c.high)),
        low: parse::num(Some(&c.low)),
        close: parse::num(Some(&c.close)),
        volume: parse::num(Some(&c.volume)),
        ..Bar::default()
    }
}

impl KrakenFetcher {
    async fn fetch_spot(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let url = self.http.url(MarketType::Spot, "/0/public/OHLC");
        let pair = req.symbol(&SPOT);
        let limit = self.http.page_limit();
        let end_secs = req.end_ms.div_euclid(1000);
        let mut since = req.start_ms.div_euclid(1000) - 1;
        let mut out = Vec::new();

        loop {
            ensure_not_cancelled(cancel)?;
            let query = [
                ("pair", pair.clone()),
                ("interval", req.interval.to_string()),
                ("since", since.to_string()),
            ];
            let env: SpotEnvelope = self.http.get_json(&url, &query, cancel).await?;
            if let Some(first) = env.error.first() {
                let code = first.split(':').next().unwrap_or(first).to_string();
                return Err(CandelaError::provider(
                    self.http.provider(),
                    code,
                    env.error.join("; "),
                ));
            }
            let last = parse::int(env.result.get("last"));
            let rows: Vec<Vec<Value>> = env
                .result
                .iter()
                .find(|(k, _)| k.as_str() != "last")
                .and_then(|(_, v)| v.as_array())
                .map(|rows| {
                    rows.iter()
                        .filter_map(|r| r.as_array().cloned())
                        .collect()
                })
                .unwrap_or_default();
            if rows.is_empty() {
                break;
            }
            let n = rows.len();
            out.extend(parse::collect(req, rows.iter().map(|r| spot_bar(r))).candles);
            let Some(next) = last else { break };
            if n < limit || next >= end_secs || !advances(req, since, next, true) {
                break;
            }
            since = next;
        }
        Ok(out)
    }

    async fn fetch_futures(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let symbol = req.symbol(&FUTURES);
        let url = self.http.url(
            MarketType::Futures,
            &format!("/api/charts/v1/trade/{symbol}/{}", req.interval),
        );
        let to = req.end_ms.div_euclid(1000);
        let mut cursor = req.start_ms;
        let mut out = Vec::new();

        while cursor < req.end_ms {
            ensure_not_cancelled(cancel)?;
            let query = [
                ("from", cursor.div_euclid(1000).to_string()),
                ("to", to.to_string()),
            ];
            let env: ChartsEnvelope = self.http.get_json(&url, &query, cancel).await?;
            if let Some(err) = env.error.filter(|e| !e.is_empty()) {
                return Err(CandelaError::provider(self.http.provider(), "error", err));
            }
            let page = parse::collect(req, env.candles.iter().map(chart_bar));
            out.extend(page.candles);
            let Some((_, newest)) = page.span else {
                break;
            };
            let next = newest.saturating_add(req.base_interval_ms);
            if !env.more_candles || !advances(req, cursor, next, true) {
                break;
            }
            cursor = next;
        }
        Ok(out)
    }
}

#[async_trait]
impl CandleFetcher for KrakenFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Kraken
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::kraken::fetch",
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
