//! Candela-specific data transfer objects, configuration primitives and the shared error type.
#![warn(missing_docs)]

mod candle;
mod config;
mod error;
mod source;
mod timeframe;

pub use candle::Candle;
pub use config::LoaderConfig;
pub use error::CandelaError;
pub use source::{DataSource, Exchange, MarketType};
pub use timeframe::TimeFrame;
