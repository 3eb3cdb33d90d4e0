use candela_core::{CancellationToken, CandelaError, CandleFetcher, DataSource, Exchange, TimeFrame};
use candela_exchanges::GateioFetcher;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{MIN, T0, client, req, starts};

#[tokio::test]
async fn spot_rows_are_close_high_low_open() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/spot/candlesticks")
                .query_param("currency_pair", "BTC_USDT")
                .query_param("interval", "1m")
                .query_param("from", (T0 / 1000).to_string())
                .query_param("to", ((T0 + 2 * MIN - 1) / 1000).to_string());
            then.status(200).json_body(json!([
                [(T0 / 1000).to_string(), "1500", "15", "16", "9", "10", "100", "true"],
                [((T0 + MIN) / 1000).to_string(), "1200", "14", "15.5", "13", "15", "80", "true"]
            ]));
        })
        .await;

    let fetcher = GateioFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Gateio), "BTC-USDT", T0, T0 + 2 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + MIN]);
    let first = out.iter().find(|c| c.start == T0).unwrap();
    assert_eq!((first.open, first.high, first.low, first.close), (10.0, 16.0, 9.0, 15.0));
    assert_eq!(first.volume, 100.0);
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn futures_rows_are_objects() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/futures/usdt/candlesticks")
                .query_param("contract", "ETH_USDT");
            then.status(200).json_body(json!([
                {"t": T0 / 1000, "v": 12, "c": "2.5", "h": "3", "l": "2", "o": "2.2", "sum": "30"}
            ]));
        })
        .await;

    let fetcher = GateioFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::futures(Exchange::Gateio), "ETH", T0, T0 + MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!((out[0].open, out[0].close, out[0].volume), (2.2, 2.5, 12.0));
}

#[tokio::test]
async fn http_error_uses_message_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v4/spot/candlesticks");
            then.status(400).json_body(
                json!({"label": "INVALID_CURRENCY_PAIR", "message": "Invalid currency pair FOO_USDT"}),
            );
        })
        .await;

    let fetcher = GateioFetcher::new(client()).with_base_urls(&server.base_url(), &server.base_url());
    let r = req(DataSource::spot(Exchange::Gateio), "FOO", T0, T0 + MIN, TimeFrame::Min1);
    let err = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CandelaError::http("gateio", 400, "Invalid currency pair FOO_USDT")
    );
}

#[tokio::test]
async fn empty_window_before_listing_does_not_stop_the_walk() {
    let server = MockServer::start_async().await;
    let empty = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/spot/candlesticks")
                .query_param("from", (T0 / 1000).to_string());
            then.status(200).json_body(json!([]));
        })
        .await;
    let listed = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/spot/candlesticks")
                .query_param("from", ((T0 + 2 * MIN) / 1000).to_string())
                .query_param("to", ((T0 + 4 * MIN - 1) / 1000).to_string());
            then.status(200).json_body(json!([
                [((T0 + 2 * MIN) / 1000).to_string(), "10", "1.5", "2", "1", "1.2", "5", "true"],
                [((T0 + 3 * MIN) / 1000).to_string(), "10", "1.6", "2", "1", "1.5", "5", "true"]
            ]));
        })
        .await;

    let fetcher = GateioFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::spot(Exchange::Gateio), "BTC", T0, T0 + 4 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0 + 2 * MIN, T0 + 3 * MIN]);
    assert_eq!(empty.calls_async().await, 1);
    assert_eq!(listed.calls_async().await, 1);
}

#[tokio::test]
async fn short_window_in_the_middle_does_not_stop_the_walk() {
    let server = MockServer::start_async().await;
    let windows = [
        (T0, json!([{"t": T0 / 1000, "v": 1, "c": "1", "h": "1", "l": "1", "o": "1"}])),
        (T0 + 2 * MIN, json!([])),
        (
            T0 + 4 * MIN,
            json!([
                {"t": (T0 + 4 * MIN) / 1000, "v": 1, "c": "1", "h": "1", "l": "1", "o": "1"},
                {"t": (T0 + 5 * MIN) / 1000, "v": 1, "c": "1", "h": "1", "l": "1", "o": "1"}
            ]),
        ),
    ];
    let mut mocks = Vec::new();
    for (from, body) in windows {
        mocks.push(
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/api/v4/futures/usdt/candlesticks")
                        .query_param("from", (from / 1000).to_string());
                    then.status(200).json_body(body);
                })
                .await,
        );
    }

    let fetcher = GateioFetcher::new(client())
        .with_base_urls(&server.base_url(), &server.base_url())
        .with_page_limit(2);
    let r = req(DataSource::futures(Exchange::Gateio), "BTC", T0, T0 + 6 * MIN, TimeFrame::Min1);
    let out = fetcher.fetch(&r, &CancellationToken::new()).await.unwrap();

    assert_eq!(starts(&out), vec![T0, T0 + 4 * MIN, T0 + 5 * MIN]);
    for m in &mocks {
        assert_eq!(m.calls_async().await, 1);
    }
}
