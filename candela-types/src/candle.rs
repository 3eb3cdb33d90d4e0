use serde::{Deserialize, Serialize};

/// One OHLCV bucket in the uniform schema produced by every fetcher.
///
/// `end - start` equals the nominal duration of `interval`. Price relations
/// (`high >= max(open, close)`, `low <= min(open, close)`) hold whenever the provider data is
/// well-formed; they are not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Inclusive bucket start, epoch milliseconds.
    pub start: i64,
    /// Exclusive bucket end, epoch milliseconds.
    pub end: i64,
    /// First traded price in the bucket.
    pub open: f64,
    /// Highest traded price in the bucket.
    pub high: f64,
    /// Lowest traded price in the bucket.
    pub low: f64,
    /// Last traded price in the bucket.
    pub close: f64,
    /// Base-asset volume, non-negative.
    pub volume: f64,
    /// Number of trades, 0 when the provider does not report it.
    pub trades: u64,
    /// Normalized symbol string.
    pub asset: String,
    /// Display label of the actual bucket width, e.g. "1h".
    pub interval: String,
}

impl Candle {
    /// Bucket width in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> i64 {
        self.end - self.start
    }

    /// Returns true if the bucket overlaps the half-open range `[start_ms, end_ms)`.
    #[must_use]
    pub const fn overlaps(&self, start_ms: i64, end_ms: i64) -> bool {
        self.end > start_ms && self.start < end_ms
    }
}
