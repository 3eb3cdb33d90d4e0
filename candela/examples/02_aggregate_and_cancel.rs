mod common;
use std::time::Duration;

use candela::{CancellationToken, CandleLoader, DataSource, Exchange, LoadRequest, TimeFrame};
use common::{get_fetcher, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let loader = CandleLoader::builder()
        .with_fetcher(get_fetcher(Exchange::Gateio)?)
        .build()?;

    // Gate.io has no 2h candles; the loader fetches 1h and aggregates pairs.
    let source = DataSource::spot(Exchange::Gateio);
    let plan = candela::resolve(source, TimeFrame::Hour2).ok_or("2h not available")?;
    println!(
        "2h on gateio: provider code {:?}, base {}, group {}",
        plan.provider_interval, plan.base_timeframe, plan.group_size
    );

    let now = chrono::Utc::now().timestamp_millis();
    let req = LoadRequest::new(source, TimeFrame::Hour2, now - 7 * 86_400_000, now, "ETH");

    // A superseded load: cancel it almost immediately.
    let stale = CancellationToken::new();
    let trigger = stale.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1)).await;
        trigger.cancel();
    });
    match loader.load_candles(&req, None, Some(&stale)).await {
        Err(e) if e.is_cancelled() => println!("first load cancelled"),
        Err(e) => return Err(e.into()),
        Ok(c) => println!("first load finished before cancellation ({} candles)", c.len()),
    }

    // The replacement load only fetches what is still missing.
    let candles = loader.load_candles(&req, None, None).await?;
    println!("{} two-hour candles for ETH-USDT", candles.len());
    if let Some(last) = candles.last() {
        println!("latest: start={} close={:.2} interval={}", last.start, last.close, last.interval);
    }
    Ok(())
}
