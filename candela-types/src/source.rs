use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CandelaError;

/// Price-data providers with a historical candle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    /// Binance (spot and USDⓈ-M futures).
    Binance,
    /// Bybit v5 (spot and linear).
    Bybit,
    /// OKX v5 (spot and perpetual swaps).
    Okx,
    /// KuCoin (spot and futures).
    Kucoin,
    /// Gate.io v4 (spot and USDT futures).
    Gateio,
    /// Coinbase Exchange (spot only).
    Coinbase,
    /// Kraken (spot and Kraken Futures).
    Kraken,
    /// Bitget v2 (spot and USDT futures).
    Bitget,
    /// HTX, formerly Huobi (spot and linear swaps).
    Htx,
    /// MEXC (spot and contract).
    Mexc,
}

impl Exchange {
    /// Every supported exchange, in registry order.
    pub const ALL: [Self; 10] = [
        Self::Binance,
        Self::Bybit,
        Self::Okx,
        Self::Kucoin,
        Self::Gateio,
        Self::Coinbase,
        Self::Kraken,
        Self::Bitget,
        Self::Htx,
        Self::Mexc,
    ];

    /// Lowercase identifier used in configuration and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bybit => "bybit",
            Self::Okx => "okx",
            Self::Kucoin => "kucoin",
            Self::Gateio => "gateio",
            Self::Coinbase => "coinbase",
            Self::Kraken => "kraken",
            Self::Bitget => "bitget",
            Self::Htx => "htx",
            Self::Mexc => "mexc",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = CandelaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == needle)
            .ok_or_else(|| CandelaError::InvalidArg(format!("unknown exchange: {s}")))
    }
}

/// Spot or derivatives market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Spot market.
    #[default]
    Spot,
    /// Perpetual or delivery futures (USDT-margined where the provider has several).
    Futures,
}

impl MarketType {
    /// Lowercase identifier used in configuration and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Futures => "futures",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = CandelaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(Self::Spot),
            "futures" | "future" | "perp" | "swap" => Ok(Self::Futures),
            _ => Err(CandelaError::InvalidArg(format!("unknown market type: {s}"))),
        }
    }
}

/// Identifies one provider and the market requested from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSource {
    /// Provider.
    pub exchange: Exchange,
    /// Spot or derivatives.
    pub market_type: MarketType,
}

impl DataSource {
    /// Build a data source.
    #[must_use]
    pub const fn new(exchange: Exchange, market_type: MarketType) -> Self {
        Self {
            exchange,
            market_type,
        }
    }

    /// Spot market on `exchange`.
    #[must_use]
    pub const fn spot(exchange: Exchange) -> Self {
        Self::new(exchange, MarketType::Spot)
    }

    /// Futures market on `exchange`.
    #[must_use]
    pub const fn futures(exchange: Exchange) -> Self {
        Self::new(exchange, MarketType::Futures)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.market_type)
    }
}
