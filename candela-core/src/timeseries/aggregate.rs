use candela_types::Candle;

struct BucketAgg {
    start: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    trades: u64,
}

impl BucketAgg {
    const fn open(start: i64, c: &Candle) -> Self {
        Self {
            start,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            trades: c.trades,
        }
    }

    fn absorb(&mut self, c: &Candle) {
        if c.high > self.high {
            self.high = c.high;
        }
        if c.low < self.low {
            self.low = c.low;
        }
        self.close = c.close;
        self.volume += c.volume;
        self.trades = self.trades.saturating_add(c.trades);
    }

    fn finish(self, target_ms: i64, asset: &str, label: &str) -> Candle {
        Candle {
            start: self.start,
            end: self.start + target_ms,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            trades: self.trades,
            asset: asset.to_string(),
            interval: label.to_string(),
        }
    }
}

/// Roll base-interval candles up into `target_ms` buckets aligned to `floor(start / target_ms)`.
///
/// Input is sorted by `start` first, so `open` comes from the earliest candle in a bucket and
/// `close` from the latest. `high`/`low` are extrema, `volume` and `trades` are sums. Every output
/// candle carries `asset` and `label` and spans exactly `target_ms`.
#[must_use]
pub fn aggregate(mut candles: Vec<Candle>, target_ms: i64, asset: &str, label: &str) -> Vec<Candle> {
    if candles.is_empty() || target_ms <= 0 {
        return Vec::new();
    }
    candles.sort_by_key(|c| c.start);

    let bucket_of = |ts: i64| ts.div_euclid(target_ms) * target_ms;

    let mut out = Vec::new();
    let mut iter = candles.iter();
    let Some(first) = iter.next() else {
        return out;
    };
    let mut cur = BucketAgg::open(bucket_of(first.start), first);

    for c in iter {
        let bucket = bucket_of(c.start);
        if bucket == cur.start {
            cur.absorb(c);
        } else {
            let done = std::mem::replace(&mut cur, BucketAgg::open(bucket, c));
            out.push(done.finish(target_ms, asset, label));
        }
    }
    out.push(cur.finish(target_ms, asset, label));
    out
}
