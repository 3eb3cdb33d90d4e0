use candela_core::{
    CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, FetchRequest, TimeFrame,
    resolve_or_err,
};
use candela_exchanges::KrakenFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, starts};

fn usd_req(source: DataSource, start: i64, end: i64) -> FetchRequest {
    let plan = resolve_or_err(source, TimeFrame::Min1).unwrap();
    FetchRequest::from_plan(source, "BTC", "USD", start, end, &plan).unwrap()
}

#[tokio::test]
async fn spot_reads_pair_key_and_trade_count() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/0/public/OHLC")
                .query_param("pair", "XBTUSD")
                .query_param("interval", "1")
                .query_param("since", (T0 / 1000 - 1).to_string());
            then.status(200).json_body(json!({
                "error": [],
                "result": {
                    "XXBTZUSD": [
                        [T0 / 1000, "100.0", "101.0", "99.0", "100.5", "100.2", "3.25", 17],
                        [(T0 + MIN) / 1000, "100.5", "102.0", "100.0", "101.5", "101.0", "1.5", 9]
                    ],
                    "last": (T0 + MIN) / 1000
                }
            }));
        })
        .await;

    let fetcher = KrakenFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = usd_req(DataSource::spot(Exchange::Kraken), T0, T0 + 2 * MIN);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + MIN]);
    let first = out.iter().find(|c| c.start == T0).unwrap();
    assert_eq!(first.volume, 3.25);
    assert_eq!(first.trades, 17);
    assert_eq!(first.asset, "BTC-USD");
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn spot_error_array_becomes_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/0/public/OHLC");
            then.status(200)
                .json_body(json!({"error": ["EQuery:Unknown asset pair"], "result": {}}));
        })
        .await;

    let fetcher = KrakenFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = usd_req(DataSource::spot(Exchange::Kraken), T0, T0 + MIN);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CandelaError::provider("kraken", "EQuery", "EQuery:Unknown asset pair")
    );
}

#[tokio::test]
async fn futures_follow_more_candles() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/charts/v1/trade/PF_XBTUSD/1m")
                .query_param("from", (T0 / 1000).to_string())
                .query_param("to", ((T0 + 3 * MIN) / 1000).to_string());
            then.status(200).json_body(json!({
                "candles": [
                    {"time": T0, "open": "1", "high": "2", "low": "0.5", "close": "1.5", "volume": 10},
                    {"time": T0 + MIN, "open": "1.5", "high": "2", "low": "1", "close": "1.8", "volume": 4}
                ],
                "more_candles": true
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/charts/v1/trade/PF_XBTUSD/1m")
                .query_param("from", ((T0 + 2 * MIN) / 1000).to_string());
            then.status(200).json_body(json!({
                "candles": [
                    {"time": T0 + 2 * MIN, "open": "1.8", "high": "1.9", "low": "1.2", "close": "1.3", "volume": 2}
                ],
                "more_candles": false
            }));
        })
        .await;

    let fetcher = KrakenFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    // USDT is spelled USD on Kraken Futures.
    let plan = resolve_or_err(DataSource::futures(Exchange::Kraken), TimeFrame::Min1).unwrap();
    let r = FetchRequest::from_plan(
        DataSource::futures(Exchange::Kraken),
        "BTC",
        "USDT",
        T0,
        T0 + 3 * MIN,
        &plan,
    )
    .unwrap();
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + MIN, T0 + 2 * MIN]);
    assert_eq!(first.calls_async().await, 1);
    assert_eq!(second.calls_async().await, 1);
}
