use std::collections::BTreeMap;

use candela_types::Candle;

/// Clip `raw` to candles overlapping `[start_ms, end_ms)`, keep the last candle seen for each
/// `start`, and return them in ascending `start` order.
#[must_use]
pub fn normalize<I>(raw: I, start_ms: i64, end_ms: i64) -> Vec<Candle>
where
    I: IntoIterator<Item = Candle>,
{
    let mut by_start: BTreeMap<i64, Candle> = BTreeMap::new();
    for c in raw {
        if c.overlaps(start_ms, end_ms) {
            by_start.insert(c.start, c);
        }
    }
    by_start.into_values().collect()
}
