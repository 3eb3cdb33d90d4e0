//! In-memory candle cache keyed by timeframe, with one owner asset per timeframe.
//!
//! Asking for a timeframe on behalf of a different asset than its current owner discards that
//! timeframe's candles before handing out the (now empty) map. Entries are never evicted by age.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::timeseries::gaps::{GapScan, scan_gaps};
use candela_types::{Candle, TimeFrame};

type SharedMap = Arc<Mutex<BTreeMap<i64, Candle>>>;

struct Slot {
    owner: String,
    map: SharedMap,
}

/// Process-wide candle store. Construct once and share by `Arc`.
#[derive(Default)]
pub struct CandleCache {
    slots: Mutex<HashMap<TimeFrame, Slot>>,
}

impl std::fmt::Debug for CandleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleCache").finish_non_exhaustive()
    }
}

impl CandleCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for `timeframe`, owned by `asset`.
    ///
    /// Creates the slot lazily. When `asset` differs from the remembered owner the slot is
    /// replaced with an empty map and `asset` becomes the owner. Handles obtained earlier by the
    /// previous owner keep pointing at the discarded map.
    pub async fn get_timeframe_cache(&self, timeframe: TimeFrame, asset: &str) -> TimeframeCache {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(timeframe).or_insert_with(|| Slot {
            owner: asset.to_string(),
            map: SharedMap::default(),
        });
        if slot.owner != asset {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                timeframe = %timeframe,
                previous = %slot.owner,
                next = %asset,
                "evicting timeframe cache on owner change"
            );
            slot.owner = asset.to_string();
            slot.map = SharedMap::default();
        }
        TimeframeCache {
            timeframe,
            owner: slot.owner.clone(),
            map: Arc::clone(&slot.map),
        }
    }

    /// Drop every timeframe and owner.
    pub async fn clear_cache(&self) {
        self.slots.lock().await.clear();
    }

    /// Current owner asset of `timeframe`.
    pub async fn owner(&self, timeframe: TimeFrame) -> Option<String> {
        self.slots
            .lock()
            .await
            .get(&timeframe)
            .map(|s| s.owner.clone())
    }

    /// Sorted copy of the candles cached for `timeframe`, regardless of owner.
    pub async fn snapshot(&self, timeframe: TimeFrame) -> Vec<Candle> {
        let map = self.slots.lock().await.get(&timeframe).map(|s| Arc::clone(&s.map));
        match map {
            Some(m) => m.lock().await.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Number of candles cached for `timeframe`.
    pub async fn len(&self, timeframe: TimeFrame) -> usize {
        let map = self.slots.lock().await.get(&timeframe).map(|s| Arc::clone(&s.map));
        match map {
            Some(m) => m.lock().await.len(),
            None => 0,
        }
    }
}

/// Handle to one timeframe's candle map, bound to the owner it was obtained for.
#[derive(Clone)]
pub struct TimeframeCache {
    timeframe: TimeFrame,
    owner: String,
    map: SharedMap,
}

impl std::fmt::Debug for TimeframeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeframeCache")
            .field("timeframe", &self.timeframe)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl TimeframeCache {
    /// Timeframe this handle belongs to.
    #[must_use]
    pub const fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    /// Owner asset at the time the handle was obtained.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Store candles keyed by their own `start`, overwriting existing entries.
    pub async fn extend<I>(&self, candles: I) -> usize
    where
        I: IntoIterator<Item = Candle>,
    {
        let mut map = self.map.lock().await;
        let mut n = 0;
        for c in candles {
            map.insert(c.start, c);
            n += 1;
        }
        n
    }

    /// Store one candle keyed by its `start`.
    pub async fn insert(&self, candle: Candle) {
        self.map.lock().await.insert(candle.start, candle);
    }

    /// All cached candles in ascending `start` order.
    pub async fn snapshot(&self) -> Vec<Candle> {
        self.map.lock().await.values().cloned().collect()
    }

    /// Number of cached candles.
    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.map.lock().await.is_empty()
    }

    /// Gap scan of `[start_ms, end_ms)` in `step_ms` buckets against the cached candles.
    pub async fn scan(&self, start_ms: i64, end_ms: i64, step_ms: i64) -> GapScan {
        let map = self.map.lock().await;
        scan_gaps(&map, start_ms, end_ms, step_ms)
    }
}
