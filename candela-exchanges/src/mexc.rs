use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::binance::fetch_klines;
use crate::http::http_fetcher;
use crate::paging::forward_windows;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SPOT: SymbolFormat = SymbolFormat::joined("");
const CONTRACT: SymbolFormat = SymbolFormat::joined("_");

http_fetcher! {
    /// MEXC spot (Binance-compatible `/api/v3/klines`) and contract klines.
    ///
    /// Contract answers are columnar and addressed by `start`/`end` in seconds.
    MexcFetcher {
        exchange: Exchange::Mexc,
        spot: "https://api.mexc.com",
        futures: "https://contract.mexc.com",
        page_limit: 1000,
    }
}

#[derive(Deserialize)]
struct ContractEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Columns>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Columns {
    time: Vec<Value>,
    open: Vec<Value>,
    close: Vec<Value>,
    high: Vec<Value>,
    low: Vec<Value>,
    vol: Vec<Value>,
}

impl Columns {
    fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        self.time.iter().enumerate().map(|(i, t)| Bar {
            start: parse::int(Some(t)).and_then(|s| s.checked_mul(1000)),
            open: parse::num(self.open.get(i)),
            high: parse::num(self.high.get(i)),
            low: parse::num(self.low.get(i)),
            close: parse::num(self.close.get(i)),
            volume: parse::num(self.vol.get(i)),
            ..Bar::default()
        })
    }
}

impl MexcFetcher {
    async fn fetch_contract(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let symbol = req.symbol(&CONTRACT);
        let url = self.http.url(
            MarketType::Futures,
            &format!("/api/v1/contract/kline/{symbol}"),
        );
        let http = &self.http;
        let url = url.as_str();

        forward_windows(req, http.page_limit(), cancel, |from, to| async move {
            let query = [
                ("interval", req.interval.to_string()),
                ("start", from.div_euclid(1000).to_string()),
                ("end", (to - 1).div_euclid(1000).to_string()),
            ];
            let env: ContractEnvelope = http.get_json(url, &query, cancel).await?;
            if !env.success || env.code != 0 {
                return Err(CandelaError::provider(
                    http.provider(),
                    env.code.to_string(),
                    env.message.unwrap_or_default(),
                ));
            }
            let columns = env.data.unwrap_or_default();
            Ok(parse::collect(req, columns.bars()))
        })
        .await
    }
}

#[async_trait]
impl CandleFetcher for MexcFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Mexc
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::mexc::fetch",
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
            MarketType::Spot => {
                let url = self.http.url(MarketType::Spot, "/api/v3/klines");
                let symbol = req.symbol(&SPOT);
                fetch_klines(&self.http, &url, &symbol, req, cancel).await
            }
            MarketType::Futures => self.fetch_contract(req, cancel).await,
        }
    }
}
