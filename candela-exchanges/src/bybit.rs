use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::http::http_fetcher;
use crate::paging::backward_pages;
use crate::parse::{self, Bar};
use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest, MarketType,
    SymbolFormat,
};

const SYMBOL: SymbolFormat = SymbolFormat::joined("");

http_fetcher! {
    /// Bybit v5 market klines for the `spot` and `linear` categories.
    ///
    /// Pages backward with the inclusive `end` cursor; lists arrive newest first.
    BybitFetcher {
        exchange: Exchange::Bybit,
        spot: "https://api.bybit.com",
        futures: "https://api.bybit.com",
        page_limit: 1000,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: Option<KlineResult>,
}

#[derive(Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<Value>>,
}

#[async_trait]
impl CandleFetcher for BybitFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::bybit::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let category = match req.source.market_type {
            MarketType::Spot => "spot",
            MarketType::Futures => "linear",
        };
        let url = self.http.url(req.source.market_type, "/v5/market/kline");
        let symbol = req.symbol(&SYMBOL);
        let limit = self.http.page_limit();
        let http = &self.http;
        let (url, symbol) = (url.as_str(), symbol.as_str());

        backward_pages(req, limit, cancel, |cursor| async move {
            let query = [
                ("category", category.to_string()),
                ("symbol", symbol.to_string()),
                ("interval", req.interval.to_string()),
                ("start", req.start_ms.to_string()),
                ("end", cursor.to_string()),
                ("limit", limit.to_string()),
            ];
            let env: Envelope = http.get_json(url, &query, cancel).await?;
            if env.ret_code != 0 {
                return Err(CandelaError::provider(
                    http.provider(),
                    env.ret_code.to_string(),
                    env.ret_msg,
                ));
            }
            let rows = env.result.map(|r| r.list).unwrap_or_default();
            Ok(parse::collect(req, rows.iter().map(|r| Bar::tohlcv(r))))
        })
        .await
    }
}
