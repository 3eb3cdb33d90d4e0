//! Time-series utilities shared by the fetchers and the loader.
//!
//! Modules include:
//! - `normalize`: clip, deduplicate and sort raw provider candles to a range
//! - `aggregate`: roll base-interval candles up into a coarser timeframe
//! - `gaps`: align ranges to the bucket grid and find missing sub-ranges in a cache
/// Range clipping, deduplication and ordering.
pub mod normalize;
/// OHLCV roll-up for synthesized timeframes.
pub mod aggregate;
/// Bucket-grid alignment and run-length gap scanning.
pub mod gaps;
