//! Lenient field coercion for provider payloads.
//!
//! Providers mix numeric strings and JSON numbers. A row whose timestamp or any OHLC price cannot
//! be read is dropped; unreadable volume reads as `0.0` and trades as `0`.
use serde_json::Value;

use candela_core::{Candle, FetchRequest};

/// Float from a JSON number or numeric string. Non-finite values are rejected.
pub(crate) fn num(v: Option<&Value>) -> Option<f64> {
    let f = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// Integer timestamp from a JSON number or numeric string.
pub(crate) fn int(v: Option<&Value>) -> Option<i64> {
    match v? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Non-negative count, 0 when absent or unreadable.
pub(crate) fn count(v: Option<&Value>) -> u64 {
    int(v).and_then(|n| u64::try_from(n).ok()).unwrap_or(0)
}

/// Fields of one provider row before validation. Times are epoch milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Bar {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub trades: u64,
}

impl Bar {
    /// Bar from a positional row `[t, o, h, l, c, v, ...]`, with `t` in milliseconds.
    pub(crate) fn tohlcv(row: &[Value]) -> Self {
        Self {
            start: int(row.first()),
            open: num(row.get(1)),
            high: num(row.get(2)),
            low: num(row.get(3)),
            close: num(row.get(4)),
            volume: num(row.get(5)),
            ..Self::default()
        }
    }

    /// Start timestamp converted from seconds.
    pub(crate) fn start_secs(mut self, secs: Option<i64>) -> Self {
        self.start = secs.and_then(|s| s.checked_mul(1000));
        self
    }

    fn into_candle(self, req: &FetchRequest, asset: &str) -> Option<Candle> {
        let start = self.start?;
        let end = match self.end.filter(|e| *e > start) {
            Some(end) => end,
            None => start.checked_add(req.base_interval_ms)?,
        };
        Some(Candle {
            start,
            end,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume.filter(|v| *v >= 0.0).unwrap_or(0.0),
            trades: self.trades,
            asset: asset.to_string(),
            interval: req.interval_label.clone(),
        })
    }
}

/// One decoded provider response.
///
/// `rows` and `span` describe what the provider sent, malformed rows included, so paging decisions
/// never depend on how many rows survived validation.
#[derive(Debug, Clone, Default)]
pub(crate) struct Page {
    /// Rows in the response.
    pub rows: usize,
    /// Oldest and newest readable row start, epoch milliseconds.
    pub span: Option<(i64, i64)>,
    /// Rows that validated.
    pub candles: Vec<Candle>,
}

/// Validate bars into candles, dropping malformed rows.
pub(crate) fn collect<I>(req: &FetchRequest, bars: I) -> Page
where
    I: IntoIterator<Item = Bar>,
{
    let asset = req.display_symbol();
    let mut page = Page::default();
    for bar in bars {
        page.rows += 1;
        if let Some(start) = bar.start {
            page.span = Some(match page.span {
                Some((lo, hi)) => (lo.min(start), hi.max(start)),
                None => (start, start),
            });
        }
        if let Some(candle) = bar.into_candle(req, &asset) {
            page.candles.push(candle);
        }
    }
    let dropped = page.rows - page.candles.len();
    if dropped > 0 {
        #[cfg(feature = "tracing")]
        tracing::warn!(source = %req.source, dropped, "dropped malformed candle rows");
    }
    page
}
