use candela_core::{CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, TimeFrame};
use candela_exchanges::KucoinFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, req, starts};

#[tokio::test]
async fn spot_rows_use_open_close_high_low_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/market/candles")
                .query_param("symbol", "BTC-USDT")
                .query_param("type", "1hour")
                .query_param("startAt", (T0 / 1000).to_string())
                .query_param("endAt", ((T0 + 2 * 3_600_000 - 1) / 1000).to_string());
            then.status(200).json_body(json!({
                "code": "200000",
                "data": [
                    [((T0 + 3_600_000) / 1000).to_string(), "10", "12", "13", "9", "5", "55"],
                    [(T0 / 1000).to_string(), "8", "10", "11", "7", "4", "40"]
                ]
            }));
        })
        .await;

    let fetcher = KucoinFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Kucoin), "btc", T0, T0 + 2 * 3_600_000, TimeFrame::Hour1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + 3_600_000]);
    let newest = out.iter().find(|c| c.start == T0 + 3_600_000).unwrap();
    assert_eq!((newest.open, newest.close, newest.high, newest.low), (10.0, 12.0, 13.0, 9.0));
    assert_eq!(newest.volume, 5.0);
    assert_eq!(newest.end, T0 + 2 * 3_600_000);
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn futures_walk_forward_windows_with_xbt_symbol() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/kline/query")
                .query_param("symbol", "XBTUSDTM")
                .query_param("granularity", "1")
                .query_param("from", T0.to_string())
                .query_param("to", (T0 + 2 * MIN - 1).to_string());
            then.status(200).json_body(json!({
                "code": "200000",
                "data": [[T0, 1.0, 2.0, 0.5, 1.5, 100], [T0 + MIN, 1.5, 2.5, 1.0, 2.0, 80]]
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/kline/query")
                .query_param("from", (T0 + 2 * MIN).to_string());
            then.status(200).json_body(json!({
                "code": "200000",
                "data": [[T0 + 2 * MIN, 2.0, 3.0, 1.5, 2.5, 60], [T0 + 3 * MIN, 2.5, 2.6, 2.0, 2.1, 40]]
            }));
        })
        .await;

    let fetcher = KucoinFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::futures(Exchange::Kucoin), "BTC", T0, T0 + 4 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), (0..4).map(|i| T0 + i * MIN).collect::<Vec<_>>());
    assert_eq!(first.calls_async().await, 1);
    assert_eq!(second.calls_async().await, 1);
}

#[tokio::test]
async fn non_success_code_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/market/candles");
            then.status(200)
                .json_body(json!({"code": "400100", "msg": "This pair is not provided at present"}));
        })
        .await;

    let fetcher = KucoinFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Kucoin), "FOO", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CandelaError::provider("kucoin", "400100", "This pair is not provided at present")
    );
}
