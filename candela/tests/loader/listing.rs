use candela::{Exchange, TimeFrame};

use crate::helpers::{HOUR, NOW, hours_back, mock_loader};

#[tokio::test]
async fn pre_listing_range_stays_a_gap() {
    let (loader, ctl) = mock_loader(Exchange::Mexc);
    ctl.set_listing(Some(NOW - 4 * HOUR)).await;
    let req = hours_back(Exchange::Mexc, TimeFrame::Hour1, 10, 0, "NEW");

    let first = loader.load_candles(&req, None, None).await.unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].start, NOW - 4 * HOUR);

    // Nothing marks the empty stretch as known-empty, so it is asked for again.
    let second = loader.load_candles(&req, None, None).await.unwrap();
    assert_eq!(second, first);
    let reqs = ctl.requests().await;
    assert_eq!(reqs.len(), 2);
    assert_eq!((reqs[1].start_ms, reqs[1].end_ms), (NOW - 10 * HOUR, NOW - 4 * HOUR));
}
