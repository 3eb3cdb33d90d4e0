use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CandelaError;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Logical candle granularity, independent of any provider vocabulary.
///
/// Durations are fixed; `Month1` is nominally 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeFrame {
    /// One minute.
    #[serde(rename = "1m")]
    Min1,
    /// Three minutes.
    #[serde(rename = "3m")]
    Min3,
    /// Five minutes.
    #[serde(rename = "5m")]
    Min5,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    Min15,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    Min30,
    /// One hour.
    #[serde(rename = "1h")]
    Hour1,
    /// Two hours.
    #[serde(rename = "2h")]
    Hour2,
    /// Four hours.
    #[serde(rename = "4h")]
    Hour4,
    /// Six hours.
    #[serde(rename = "6h")]
    Hour6,
    /// Eight hours.
    #[serde(rename = "8h")]
    Hour8,
    /// Twelve hours.
    #[serde(rename = "12h")]
    Hour12,
    /// One day.
    #[serde(rename = "1d")]
    Day1,
    /// Three days.
    #[serde(rename = "3d")]
    Day3,
    /// One week.
    #[serde(rename = "1w")]
    Week1,
    /// One month (30 days).
    #[serde(rename = "1M")]
    Month1,
}

impl TimeFrame {
    /// Every timeframe, finest first.
    pub const ALL: [Self; 15] = [
        Self::Min1,
        Self::Min3,
        Self::Min5,
        Self::Min15,
        Self::Min30,
        Self::Hour1,
        Self::Hour2,
        Self::Hour4,
        Self::Hour6,
        Self::Hour8,
        Self::Hour12,
        Self::Day1,
        Self::Day3,
        Self::Week1,
        Self::Month1,
    ];

    /// Nominal bucket width in milliseconds.
    #[must_use]
    pub const fn duration_ms(self) -> i64 {
        match self {
            Self::Min1 => MINUTE_MS,
            Self::Min3 => 3 * MINUTE_MS,
            Self::Min5 => 5 * MINUTE_MS,
            Self::Min15 => 15 * MINUTE_MS,
            Self::Min30 => 30 * MINUTE_MS,
            Self::Hour1 => HOUR_MS,
            Self::Hour2 => 2 * HOUR_MS,
            Self::Hour4 => 4 * HOUR_MS,
            Self::Hour6 => 6 * HOUR_MS,
            Self::Hour8 => 8 * HOUR_MS,
            Self::Hour12 => 12 * HOUR_MS,
            Self::Day1 => DAY_MS,
            Self::Day3 => 3 * DAY_MS,
            Self::Week1 => 7 * DAY_MS,
            Self::Month1 => 30 * DAY_MS,
        }
    }

    /// Nominal bucket width in whole seconds.
    #[must_use]
    pub const fn duration_secs(self) -> i64 {
        self.duration_ms() / 1000
    }

    /// Display label, also used as the `interval` of produced candles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Day3 => "3d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = CandelaError;

    /// Parses display labels. `M` is month while `m` is minute, so the match is case-sensitive
    /// except for the day/week/hour suffixes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(tf) = Self::ALL.into_iter().find(|tf| tf.label() == t) {
            return Ok(tf);
        }
        let lowered = t.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .filter(|tf| *tf != Self::Month1)
            .find(|tf| tf.label() == lowered && !t.ends_with('M'))
            .ok_or_else(|| CandelaError::InvalidArg(format!("unknown timeframe: {s}")))
    }
}
