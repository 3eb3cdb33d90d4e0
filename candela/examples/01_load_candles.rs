mod common;
use candela::{CandleLoader, DataSource, Exchange, LoadRequest, TimeFrame};
use common::{get_fetcher, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 1. Build a loader with a single Binance fetcher.
    let loader = CandleLoader::builder()
        .with_fetcher(get_fetcher(Exchange::Binance)?)
        .build()?;

    // 2. Ask for the last 48 hours of hourly BTC/USDT candles.
    let now = chrono::Utc::now().timestamp_millis();
    let req = LoadRequest::new(
        DataSource::spot(Exchange::Binance),
        TimeFrame::Hour1,
        now - 48 * 3_600_000,
        now,
        "BTC",
    );

    let print_snapshot = |cached: &[candela::Candle]| {
        println!("cache held {} candles before fetching", cached.len());
    };

    // 3. First call fills the cache; the loader pads the range by 200 buckets on each side.
    let candles = loader.load_candles(&req, Some(&print_snapshot), None).await?;
    println!("\n## {} candles for {}", candles.len(), req.asset);
    for c in candles.iter().rev().take(5) {
        println!(
            "{}  o={:.2} h={:.2} l={:.2} c={:.2} v={:.4}",
            chrono::DateTime::from_timestamp_millis(c.start).unwrap_or_default(),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        );
    }

    // 4. The same request again is answered from the cache.
    let again = loader.load_candles(&req, Some(&print_snapshot), None).await?;
    println!("\nsecond call returned {} candles", again.len());

    Ok(())
}
