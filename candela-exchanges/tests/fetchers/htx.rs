use candela_core::{CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, TimeFrame};
use candela_exchanges::HtxFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, req, starts};

fn row(t_ms: i64) -> serde_json::Value {
    json!({
        "id": t_ms / 1000,
        "open": 10.0,
        "close": 11.0,
        "low": 9.5,
        "high": 11.5,
        "amount": 3.0,
        "vol": 33.0,
        "count": 7
    })
}

#[tokio::test]
async fn spot_is_one_lowercase_batch() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/market/history/kline")
                .query_param("symbol", "btcusdt")
                .query_param("period", "1min")
                .query_param("size", "2000");
            then.status(200).json_body(json!({
                "status": "ok",
                "ch": "market.btcusdt.kline.1min",
                "data": [row(T0 + MIN), row(T0)]
            }));
        })
        .await;

    let fetcher = HtxFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Htx), "BTC", T0, T0 + 2 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + MIN]);
    assert_eq!(out[0].volume, 3.0);
    assert_eq!(out[0].trades, 7);
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn swaps_use_contract_code_windows() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/linear-swap-ex/market/history/kline")
                .query_param("contract_code", "BTC-USDT")
                .query_param("from", (T0 / 1000).to_string())
                .query_param("to", ((T0 + 2 * MIN - 1) / 1000).to_string());
            then.status(200)
                .json_body(json!({"status": "ok", "data": [row(T0), row(T0 + MIN)]}));
        })
        .await;

    let fetcher = HtxFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::futures(Exchange::Htx), "BTC-USDT", T0, T0 + 2 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();
    assert_eq!(starts(&out), vec![T0, T0 + MIN]);
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/market/history/kline");
            then.status(200).json_body(json!({
                "status": "error",
                "err-code": "invalid-parameter",
                "err-msg": "invalid symbol"
            }));
        })
        .await;

    let fetcher = HtxFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Htx), "NOPE", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CandelaError::provider("htx", "invalid-parameter", "invalid symbol")
    );
}
