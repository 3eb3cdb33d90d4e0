use candela_core::{CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, TimeFrame};
use candela_exchanges::BitgetFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, req, starts, tohlcv};

#[tokio::test]
async fn spot_pages_backward_by_end_time() {
    let server = MockServer::start_async().await;
    let newest = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/spot/market/candles")
                .query_param("symbol", "BTCUSDT")
                .query_param("granularity", "1min")
                .query_param("startTime", T0.to_string())
                .query_param("endTime", (T0 + 3 * MIN - 1).to_string())
                .query_param("limit", "2");
            then.status(200).json_body(json!({
                "code": "00000",
                "msg": "success",
                "data": [tohlcv(T0 + MIN), tohlcv(T0 + 2 * MIN)]
            }));
        })
        .await;
    let oldest = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/spot/market/candles")
                .query_param("endTime", (T0 + MIN - 1).to_string());
            then.status(200).json_body(json!({
                "code": "00000",
                "msg": "success",
                "data": [tohlcv(T0)]
            }));
        })
        .await;

    let fetcher = BitgetFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::spot(Exchange::Bitget), "BTC", T0, T0 + 3 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + MIN, T0 + 2 * MIN]);
    assert_eq!(newest.calls_async().await, 1);
    assert_eq!(oldest.calls_async().await, 1);
}

#[tokio::test]
async fn futures_send_product_type() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/mix/market/candles")
                .query_param("symbol", "ETHUSDT")
                .query_param("granularity", "1m")
                .query_param("productType", "usdt-futures");
            then.status(200)
                .json_body(json!({"code": "00000", "msg": "success", "data": [tohlcv(T0)]}));
        })
        .await;

    let fetcher = BitgetFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::futures(Exchange::Bitget), "ETH", T0, T0 + MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].asset, "ETH-USDT");
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn error_code_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/spot/market/candles");
            then.status(200)
                .json_body(json!({"code": "40034", "msg": "Parameter does not exist", "data": []}));
        })
        .await;

    let fetcher = BitgetFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Bitget), "NOPE", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CandelaError::provider("bitget", "40034", "Parameter does not exist")
    );
}
