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

const SPOT: SymbolFormat = SymbolFormat::joined("-");
const SWAP: SymbolFormat = SymbolFormat::joined("-").suffix("-SWAP");

http_fetcher! {
    /// OKX v5 `history-candles` for spot pairs and USDT perpetual swaps.
    ///
    /// Pages backward with the exclusive `after` cursor, 100 rows at most per page.
    OkxFetcher {
        exchange: Exchange::Okx,
        spot: "https://www.okx.com",
        futures: "https://www.okx.com",
        page_limit: 100,
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[async_trait]
impl CandleFetcher for OkxFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Okx
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::okx::fetch",
            skip(self, cancel),
            fields(market = %req.source.market_type, asset = %req.asset, interval = req.interval),
        )
    )]
    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        let inst_id = match req.source.market_type {
            MarketType::Spot => req.symbol(&SPOT),
            MarketType::Futures => req.symbol(&SWAP),
        };
        let url = self
            .http
            .url(req.source.market_type, "/api/v5/market/history-candles");
        let limit = self.http.page_limit();
        let http = &self.http;
        let (url, inst_id) = (url.as_str(), inst_id.as_str());

        backward_pages(req, limit, cancel, |cursor| async move {
            let query = [
                ("instId", inst_id.to_string()),
                ("bar", req.interval.to_string()),
                ("after", (cursor + 1).to_string()),
                ("limit", limit.to_string()),
            ];
            let env: Envelope = http.get_json(url, &query, cancel).await?;
            if env.code != "0" {
                return Err(CandelaError::provider(http.provider(), env.code, env.msg));
            }
            Ok(parse::collect(req, env.data.iter().map(|r| Bar::tohlcv(r))))
        })
        .await
    }
}
