use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::http::{Http, http_fetcher};
use crate::paging::forward_windows;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat, ensure_not_cancelled,
};

const SPOT: SymbolFormat = SymbolFormat::joined("").lowercase();
const SWAP: SymbolFormat = SymbolFormat::joined("-");

http_fetcher! {
    /// HTX (Huobi) spot and USDT-margined linear swaps.
    ///
    /// Spot answers one fixed-size batch of the most recent bars with no cursor. Swaps walk
    /// forward in windows using `from`/`to` in seconds.
    HtxFetcher {
        exchange: Exchange::Htx,
        spot: "https://api.huobi.pro",
        futures: "https://api.hbdm.com",
        page_limit: 2000,
    }
}

#[derive(Deserialize)]
struct Envelope {
    status: String,
    #[serde(default, rename = "err-code")]
    err_code: Option<String>,
    #[serde(default, rename = "err-msg")]
    err_msg: Option<String>,
    #[serde(default)]
    data: Vec<Row>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Row {
    id: Value,
    open: Value,
    close: Value,
    low: Value,
    high: Value,
    amount: Value,
    count: Value,
}

fn bar(r: &Row) -> Bar {
    Bar {
        start: parse::int(Some(&r.id)).and_then(|s| s.checked_mul(1000)),
        open: parse::num(Some(&r.open)),
        high: parse::num(Some(&r.high)),
        low: parse::num(Some(&r.low)),
        close: parse::num(Some(&r.close)),
        volume: parse::num(Some(&r.amount)),
        trades: parse::count(Some(&r.count)),
        ..Bar::default()
    }
}

async fn get_rows(
    http: &Http,
    url: &str,
    query: &[(&str, String)],
    cancel: &CancellationToken,
) -> Result<Vec<Row>, CandelaError> {
    let env: Envelope = http.get_json(url, query, cancel).await?;
    if env.status != "ok" {
        return Err(CandelaError::provider(
            http.provider(),
            env.err_code.unwrap_or(env.status),
            env.err_msg.unwrap_or_default(),
        ));
    }
    Ok(env.data)
}

#[async_trait]
impl CandleFetcher for HtxFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Htx
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::htx::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let http = &self.http;
        match req.source.market_type {
            MarketType::Spot => {
                ensure_not_cancelled(cancel)?;
                let url = http.url(MarketType::Spot, "/market/history/kline");
                let query = [
                    ("symbol", req.symbol(&SPOT)),
                    ("period", req.interval.to_string()),
                    ("size", http.page_limit().to_string()),
                ];
                let rows = get_rows(http, &url, &query, cancel).await?;
                Ok(parse::collect(req, rows.iter().map(bar)).candles)
            }
            MarketType::Futures => {
                let url = http.url(MarketType::Futures, "/linear-swap-ex/market/history/kline");
                let contract = req.symbol(&SWAP);
                let (url, contract) = (url.as_str(), contract.as_str());
                forward_windows(req, http.page_limit(), cancel, |from, to| async move {
                    let query = [
                        ("contract_code", contract.to_string()),
                        ("period", req.interval.to_string()),
                        ("from", from.div_euclid(1000).to_string()),
                        ("to", (to - 1).div_euclid(1000).to_string()),
                    ];
                    let rows = get_rows(http, url, &query, cancel).await?;
                    Ok(parse::collect(req, rows.iter().map(bar)))
                })
                .await
            }
        }
    }
}
