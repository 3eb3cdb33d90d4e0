use candela_core::{CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, TimeFrame};
use candela_exchanges::BinanceFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, kline, req, starts};

#[tokio::test]
async fn pages_forward_until_a_short_page() {
    let server = MockServer::start_async().await;
    let pages = [
        (T0, vec![kline(T0), kline(T0 + MIN)]),
        (T0 + MIN + 1, vec![kline(T0 + 2 * MIN), kline(T0 + 3 * MIN)]),
        (T0 + 3 * MIN + 1, vec![kline(T0 + 4 * MIN)]),
    ];
    let mut mocks = Vec::new();
    for (cursor, rows) in pages {
        mocks.push(
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/api/v3/klines")
                        .query_param("symbol", "BTCUSDT")
                        .query_param("interval", "1m")
                        .query_param("startTime", cursor.to_string())
                        .query_param("limit", "2");
                    then.status(200).json_body(json!(rows));
                })
                .await,
        );
    }

    let fetcher = BinanceFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::spot(Exchange::Binance), "BTC", T0, T0 + 5 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), (0..5).map(|i| T0 + i * MIN).collect::<Vec<_>>());
    let first = out.iter().find(|c| c.start == T0).unwrap();
    assert_eq!(first.end, T0 + MIN);
    assert_eq!(first.open, 100.0);
    assert_eq!(first.high, 110.5);
    assert_eq!(first.low, 95.25);
    assert_eq!(first.close, 105.0);
    assert_eq!(first.volume, 12.5);
    assert_eq!(first.trades, 42);
    assert_eq!(first.asset, "BTC-USDT");
    assert_eq!(first.interval, "1m");
    for m in &mocks {
        assert_eq!(m.calls_async().await, 1);
    }
}

#[tokio::test]
async fn futures_use_fapi_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/fapi/v1/klines").query_param("symbol", "ETHUSDT");
            then.status(200).json_body(json!([kline(T0)]));
        })
        .await;

    let fetcher = BinanceFetcher::new(client()).with_base_urls("http://unused.invalid", &server.base_url());
    let r = req(DataSource::futures(Exchange::Binance), "ETH-USDT", T0, T0 + MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn http_errors_carry_provider_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/klines");
            then.status(400)
                .json_body(json!({"code": -1121, "msg": "Invalid symbol."}));
        })
        .await;

    let fetcher = BinanceFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Binance), "NOPE", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err, CandelaError::http("binance", 400, "Invalid symbol."));
    assert!(err.is_actionable());
}

#[tokio::test]
async fn malformed_rows_are_dropped_not_fatal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/klines");
            then.status(200).json_body(json!([
                kline(T0),
                [T0 + MIN, "abc", "1", "1", "1", "1"],
                ["not-a-time", "1", "1", "1", "1", "1"],
                [T0 + 2 * MIN, "1", "2", "0.5", "1.5"]
            ]));
        })
        .await;

    let fetcher = BinanceFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Binance), "BTC", T0, T0 + 3 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();
    assert_eq!(starts(&out), vec![T0, T0 + 2 * MIN]);
    let last = out.iter().find(|c| c.start == T0 + 2 * MIN).unwrap();
    assert_eq!(last.volume, 0.0);
    assert_eq!(last.end, T0 + 3 * MIN);
}

#[tokio::test]
async fn undecodable_body_is_a_data_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/klines");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let fetcher = BinanceFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Binance), "BTC", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, CandelaError::Data(_)));
}

#[tokio::test]
async fn malformed_row_in_full_page_keeps_paging() {
    let server = MockServer::start_async().await;
    let mut bad = kline(T0 + MIN);
    bad[1] = json!("garbage");
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/klines")
                .query_param("startTime", T0.to_string());
            then.status(200).json_body(json!([kline(T0), bad]));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/klines")
                .query_param("startTime", (T0 + MIN + 1).to_string());
            then.status(200)
                .json_body(json!([kline(T0 + 2 * MIN), kline(T0 + 3 * MIN)]));
        })
        .await;
    let third = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/klines")
                .query_param("startTime", (T0 + 3 * MIN + 1).to_string());
            then.status(200).json_body(json!([]));
        })
        .await;

    let fetcher = BinanceFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::spot(Exchange::Binance), "BTC", T0, T0 + 4 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + 2 * MIN, T0 + 3 * MIN]);
    assert_eq!(first.calls_async().await, 1);
    assert_eq!(second.calls_async().await, 1);
    assert_eq!(third.calls_async().await, 1);
}
