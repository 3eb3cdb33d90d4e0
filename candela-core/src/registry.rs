use candela_types::{CandelaError, DataSource, Exchange, MarketType, TimeFrame};

/// A provider-native interval code paired with the logical timeframe it serves.
pub type IntervalCode = (TimeFrame, &'static str);

/// Outcome of resolving a logical timeframe against one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPlan {
    /// Provider-native interval code sent on the wire.
    pub provider_interval: &'static str,
    /// Timeframe the provider will actually return.
    pub base_timeframe: TimeFrame,
    /// Number of consecutive base candles folded into one requested candle (1 = native).
    pub group_size: u32,
}

impl IntervalPlan {
    /// Returns true when the provider serves the requested timeframe directly.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.group_size == 1
    }

    /// Width of one base candle in milliseconds.
    #[must_use]
    pub const fn base_interval_ms(&self) -> i64 {
        self.base_timeframe.duration_ms()
    }
}

use TimeFrame::{
    Day1, Day3, Hour1, Hour2, Hour4, Hour6, Hour8, Hour12, Min1, Min3, Min5, Min15, Min30, Month1,
    Week1,
};

const BINANCE: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min3, "3m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "1h"),
    (Hour2, "2h"),
    (Hour4, "4h"),
    (Hour6, "6h"),
    (Hour8, "8h"),
    (Hour12, "12h"),
    (Day1, "1d"),
    (Day3, "3d"),
    (Week1, "1w"),
    (Month1, "1M"),
];

const BYBIT: &[IntervalCode] = &[
    (Min1, "1"),
    (Min3, "3"),
    (Min5, "5"),
    (Min15, "15"),
    (Min30, "30"),
    (Hour1, "60"),
    (Hour2, "120"),
    (Hour4, "240"),
    (Hour6, "360"),
    (Hour12, "720"),
    (Day1, "D"),
    (Week1, "W"),
    (Month1, "M"),
];

// UTC-anchored variants for 6h and above; the plain codes follow Hong Kong time.
const OKX: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min3, "3m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "1H"),
    (Hour2, "2H"),
    (Hour4, "4H"),
    (Hour6, "6Hutc"),
    (Hour12, "12Hutc"),
    (Day1, "1Dutc"),
    (Day3, "3Dutc"),
    (Week1, "1Wutc"),
    (Month1, "1Mutc"),
];

const KUCOIN_SPOT: &[IntervalCode] = &[
    (Min1, "1min"),
    (Min3, "3min"),
    (Min5, "5min"),
    (Min15, "15min"),
    (Min30, "30min"),
    (Hour1, "1hour"),
    (Hour2, "2hour"),
    (Hour4, "4hour"),
    (Hour6, "6hour"),
    (Hour8, "8hour"),
    (Hour12, "12hour"),
    (Day1, "1day"),
    (Week1, "1week"),
    (Month1, "1month"),
];

// Granularity in minutes.
const KUCOIN_FUTURES: &[IntervalCode] = &[
    (Min1, "1"),
    (Min5, "5"),
    (Min15, "15"),
    (Min30, "30"),
    (Hour1, "60"),
    (Hour2, "120"),
    (Hour4, "240"),
    (Hour8, "480"),
    (Hour12, "720"),
    (Day1, "1440"),
    (Week1, "10080"),
];

const GATEIO: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "1h"),
    (Hour4, "4h"),
    (Hour8, "8h"),
    (Day1, "1d"),
    (Week1, "7d"),
    (Month1, "30d"),
];

// Granularity in seconds.
const COINBASE: &[IntervalCode] = &[
    (Min1, "60"),
    (Min5, "300"),
    (Min15, "900"),
    (Hour1, "3600"),
    (Hour6, "21600"),
    (Day1, "86400"),
];

// Interval in minutes.
const KRAKEN_SPOT: &[IntervalCode] = &[
    (Min1, "1"),
    (Min5, "5"),
    (Min15, "15"),
    (Min30, "30"),
    (Hour1, "60"),
    (Hour4, "240"),
    (Day1, "1440"),
    (Week1, "10080"),
];

const KRAKEN_FUTURES: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "1h"),
    (Hour4, "4h"),
    (Hour12, "12h"),
    (Day1, "1d"),
    (Week1, "1w"),
];

const BITGET_SPOT: &[IntervalCode] = &[
    (Min1, "1min"),
    (Min3, "3min"),
    (Min5, "5min"),
    (Min15, "15min"),
    (Min30, "30min"),
    (Hour1, "1h"),
    (Hour4, "4h"),
    (Hour6, "6h"),
    (Hour12, "12h"),
    (Day1, "1day"),
    (Day3, "3day"),
    (Week1, "1week"),
    (Month1, "1M"),
];

const BITGET_FUTURES: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min3, "3m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "1H"),
    (Hour4, "4H"),
    (Hour6, "6H"),
    (Hour12, "12H"),
    (Day1, "1D"),
    (Day3, "3D"),
    (Week1, "1W"),
    (Month1, "1M"),
];

const HTX: &[IntervalCode] = &[
    (Min1, "1min"),
    (Min5, "5min"),
    (Min15, "15min"),
    (Min30, "30min"),
    (Hour1, "60min"),
    (Hour4, "4hour"),
    (Day1, "1day"),
    (Week1, "1week"),
    (Month1, "1mon"),
];

const MEXC_SPOT: &[IntervalCode] = &[
    (Min1, "1m"),
    (Min5, "5m"),
    (Min15, "15m"),
    (Min30, "30m"),
    (Hour1, "60m"),
    (Hour4, "4h"),
    (Day1, "1d"),
    (Week1, "1W"),
    (Month1, "1M"),
];

const MEXC_FUTURES: &[IntervalCode] = &[
    (Min1, "Min1"),
    (Min5, "Min5"),
    (Min15, "Min15"),
    (Min30, "Min30"),
    (Hour1, "Min60"),
    (Hour4, "Hour4"),
    (Hour8, "Hour8"),
    (Day1, "Day1"),
    (Week1, "Week1"),
    (Month1, "Month1"),
];

/// Interval vocabulary for a data source. Empty when the provider has no such market.
#[must_use]
pub const fn interval_map(source: DataSource) -> &'static [IntervalCode] {
    match (source.exchange, source.market_type) {
        (Exchange::Binance, _) => BINANCE,
        (Exchange::Bybit, _) => BYBIT,
        (Exchange::Okx, _) => OKX,
        (Exchange::Kucoin, MarketType::Spot) => KUCOIN_SPOT,
        (Exchange::Kucoin, MarketType::Futures) => KUCOIN_FUTURES,
        (Exchange::Gateio, _) => GATEIO,
        (Exchange::Coinbase, MarketType::Spot) => COINBASE,
        (Exchange::Coinbase, MarketType::Futures) => &[],
        (Exchange::Kraken, MarketType::Spot) => KRAKEN_SPOT,
        (Exchange::Kraken, MarketType::Futures) => KRAKEN_FUTURES,
        (Exchange::Bitget, MarketType::Spot) => BITGET_SPOT,
        (Exchange::Bitget, MarketType::Futures) => BITGET_FUTURES,
        (Exchange::Htx, _) => HTX,
        (Exchange::Mexc, MarketType::Spot) => MEXC_SPOT,
        (Exchange::Mexc, MarketType::Futures) => MEXC_FUTURES,
    }
}

/// Timeframes the provider serves natively.
pub fn supported_timeframes(source: DataSource) -> impl Iterator<Item = TimeFrame> {
    interval_map(source).iter().map(|&(tf, _)| tf)
}

/// Resolve a logical timeframe to a provider interval, synthesizing it when needed.
///
/// Exact support passes through with `group_size == 1`. Otherwise the largest supported
/// timeframe whose duration evenly divides the requested one is chosen so that aggregation never
/// produces partial buckets. Returns `None` when nothing divides evenly.
#[must_use]
pub fn resolve(source: DataSource, timeframe: TimeFrame) -> Option<IntervalPlan> {
    resolve_in(interval_map(source), timeframe)
}

/// [`resolve`] against an explicit interval table.
#[must_use]
pub fn resolve_in(map: &[IntervalCode], timeframe: TimeFrame) -> Option<IntervalPlan> {
    if let Some(&(_, code)) = map.iter().find(|&&(tf, _)| tf == timeframe) {
        return Some(IntervalPlan {
            provider_interval: code,
            base_timeframe: timeframe,
            group_size: 1,
        });
    }

    let requested_ms = timeframe.duration_ms();
    let mut best_divisor: Option<IntervalCode> = None;
    for &(tf, code) in map {
        let ms = tf.duration_ms();
        if ms < requested_ms
            && requested_ms % ms == 0
            && best_divisor.is_none_or(|(b, _)| ms > b.duration_ms())
        {
            best_divisor = Some((tf, code));
        }
    }

    best_divisor.and_then(|(tf, code)| {
        let group = requested_ms / tf.duration_ms();
        Some(IntervalPlan {
            provider_interval: code,
            base_timeframe: tf,
            group_size: u32::try_from(group).ok()?,
        })
    })
}

/// Like [`resolve`], but reports the unsupported combination as a typed error.
///
/// # Errors
/// Returns `CandelaError::UnsupportedTimeframe` when no direct or evenly dividing interval exists.
pub fn resolve_or_err(source: DataSource, timeframe: TimeFrame) -> Result<IntervalPlan, CandelaError> {
    resolve(source, timeframe).ok_or_else(|| {
        CandelaError::unsupported_timeframe(
            source.exchange.as_str(),
            source.market_type.as_str(),
            timeframe.label(),
        )
    })
}

/// Whether the timeframe can be served natively or by aggregation.
#[must_use]
pub fn is_timeframe_supported(source: DataSource, timeframe: TimeFrame) -> bool {
    resolve(source, timeframe).is_some()
}
