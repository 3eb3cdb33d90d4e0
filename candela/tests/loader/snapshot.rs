use std::sync::{Arc, Mutex};

use candela::{Candle, Exchange, TimeFrame};

use crate::helpers::{hours_back, mock_loader};

#[tokio::test]
async fn snapshot_reports_cached_candles_before_fetching() {
    let (loader, _ctl) = mock_loader(Exchange::Bitget);
    let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let sink = Arc::clone(&seen);
    let on_snapshot = move |cached: &[Candle]| sink.lock().unwrap().push(cached.len());

    let small = hours_back(Exchange::Bitget, TimeFrame::Hour1, 4, 0, "BTC");
    let wide = hours_back(Exchange::Bitget, TimeFrame::Hour1, 10, 0, "BTC");
    loader.load_candles(&small, Some(&on_snapshot), None).await.unwrap();
    loader.load_candles(&wide, Some(&on_snapshot), None).await.unwrap();
    // Pure cache hit still reports.
    loader.load_candles(&wide, Some(&on_snapshot), None).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0, 4, 10]);
}
