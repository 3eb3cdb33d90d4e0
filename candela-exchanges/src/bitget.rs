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
const OK: &str = "00000";

http_fetcher! {
    /// Bitget v2 spot and USDT-margined mix candles.
    ///
    /// Pages backward with `endTime`.
    BitgetFetcher {
        exchange: Exchange::Bitget,
        spot: "https://api.bitget.com",
        futures: "https://api.bitget.com",
        page_limit: 1000,
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
impl CandleFetcher for BitgetFetcher {
    fn exchange(&self) -> Exchange {
        Exchange::Bitget
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::exchanges::bitget::fetch",
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
        let path = match market {
            MarketType::Spot => "/api/v2/spot/market/candles",
            MarketType::Futures => "/api/v2/mix/market/candles",
        };
        let url = self.http.url(market, path);
        let symbol = req.symbol(&SYMBOL);
        let limit = self.http.page_limit();
        let http = &self.http;
        let (url, symbol) = (url.as_str(), symbol.as_str());

        backward_pages(req, limit, cancel, |cursor| async move {
            let mut query = vec![
                ("symbol", symbol.to_string()),
                ("granularity", req.interval.to_string()),
                ("startTime", req.start_ms.to_string()),
                ("endTime", cursor.to_string()),
                ("limit", limit.to_string()),
            ];
            if market == MarketType::Futures {
                query.push(("productType", "usdt-futures".to_string()));
            }
            let env: Envelope = http.get_json(url, &query, cancel).await?;
            if env.code != OK {
                return Err(CandelaError::provider(http.provider(), env.code, env.msg));
            }
            Ok(parse::collect(req, env.data.iter().map(|r| Bar::tohlcv(r))))
        })
        .await
    }
}
