use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candela workspace.
///
/// Separates resolver failures (the provider cannot serve a timeframe), transport and
/// provider-coded failures, undecodable payloads, and cooperative cancellation so that callers can
/// drop superseded requests without reporting them as failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandelaError {
    /// No direct or evenly dividing interval exists for the provider and timeframe.
    #[error("unsupported timeframe {timeframe} for {exchange} {market_type}")]
    UnsupportedTimeframe {
        /// Exchange identifier, e.g. "binance".
        exchange: String,
        /// Market type identifier, e.g. "spot".
        market_type: String,
        /// Requested timeframe label, e.g. "1h".
        timeframe: String,
    },

    /// No fetcher is registered for the exchange or the exchange lacks the market type.
    #[error("unsupported data source: {exchange} {market_type}")]
    UnsupportedSource {
        /// Exchange identifier.
        exchange: String,
        /// Market type identifier.
        market_type: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        /// Provider name that failed.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Provider message or response body excerpt.
        message: String,
    },

    /// The provider answered successfully at the HTTP level but with an error-coded envelope.
    #[error("{provider} error {code}: {message}")]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Provider-native error code.
        code: String,
        /// Provider-native error message.
        message: String,
    },

    /// The request never produced an HTTP response (connect failure, timeout, reset).
    #[error("{provider} transport failure: {message}")]
    Transport {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        message: String,
    },

    /// The response could not be decoded into the expected envelope.
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The request was cancelled by its caller.
    #[error("request cancelled")]
    Cancelled,
}

impl CandelaError {
    /// Helper: build an `UnsupportedTimeframe` error.
    pub fn unsupported_timeframe(
        exchange: impl Into<String>,
        market_type: impl Into<String>,
        timeframe: impl Into<String>,
    ) -> Self {
        Self::UnsupportedTimeframe {
            exchange: exchange.into(),
            market_type: market_type.into(),
            timeframe: timeframe.into(),
        }
    }

    /// Helper: build an `UnsupportedSource` error.
    pub fn unsupported_source(exchange: impl Into<String>, market_type: impl Into<String>) -> Self {
        Self::UnsupportedSource {
            exchange: exchange.into(),
            market_type: market_type.into(),
        }
    }

    /// Helper: build an `Http` error.
    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Helper: build a `Provider` error from an error-coded envelope.
    pub fn provider(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Helper: build a `Transport` error.
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error is a cooperative cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Cancellation marks a superseded request, and unsupported combinations are expected to be
    /// filtered out upfront through `is_timeframe_supported`.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(
            self,
            Self::Cancelled | Self::UnsupportedTimeframe { .. } | Self::UnsupportedSource { .. }
        )
    }

    /// Name of the provider that produced the error, when known.
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        match self {
            Self::Http { provider, .. }
            | Self::Provider { provider, .. }
            | Self::Transport { provider, .. } => Some(provider),
            Self::UnsupportedTimeframe { exchange, .. } | Self::UnsupportedSource { exchange, .. } => {
                Some(exchange)
            }
            _ => None,
        }
    }
}
