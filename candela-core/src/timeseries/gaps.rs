use std::collections::BTreeMap;

use candela_types::Candle;

/// A contiguous run of buckets missing from a cache, as `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gap {
    /// First missing bucket start.
    pub start: i64,
    /// End of the last missing bucket.
    pub end: i64,
}

impl Gap {
    /// Number of `step`-wide buckets in the gap.
    #[must_use]
    pub const fn buckets(&self, step: i64) -> i64 {
        if step <= 0 {
            return 0;
        }
        (self.end - self.start) / step
    }
}

/// Result of walking an aligned range bucket by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapScan {
    /// Number of buckets already present in the cache.
    pub cached_buckets: usize,
    /// Missing runs, ascending and non-adjacent.
    pub gaps: Vec<Gap>,
}

impl GapScan {
    /// True when every bucket is cached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Floor `start_ms` and ceil `end_ms` to multiples of `step_ms`.
///
/// A non-positive step returns the input unchanged.
#[must_use]
pub const fn align_range(start_ms: i64, end_ms: i64, step_ms: i64) -> (i64, i64) {
    if step_ms <= 0 {
        return (start_ms, end_ms);
    }
    let start = start_ms.div_euclid(step_ms) * step_ms;
    let floor_end = end_ms.div_euclid(step_ms) * step_ms;
    let end = if floor_end == end_ms {
        end_ms
    } else {
        floor_end + step_ms
    };
    (start, end)
}

/// Run-length scan of `[start_ms, end_ms)` in `step_ms` buckets against `cached`.
///
/// A bucket counts as cached when some candle starts inside `[bucket, bucket + step_ms)`; each
/// maximal run of uncached buckets becomes one [`Gap`]. Every bucket of the range is either counted
/// in `cached_buckets` or covered by exactly one gap.
#[must_use]
pub fn scan_gaps(cached: &BTreeMap<i64, Candle>, start_ms: i64, end_ms: i64, step_ms: i64) -> GapScan {
    let mut scan = GapScan::default();
    if step_ms <= 0 || end_ms <= start_ms {
        return scan;
    }

    let mut open_gap: Option<i64> = None;
    let mut bucket = start_ms;
    while bucket < end_ms {
        let next = bucket.saturating_add(step_ms);
        let present = cached.range(bucket..next).next().is_some();
        match (present, open_gap) {
            (true, Some(gap_start)) => {
                scan.gaps.push(Gap {
                    start: gap_start,
                    end: bucket,
                });
                open_gap = None;
                scan.cached_buckets += 1;
            }
            (true, None) => scan.cached_buckets += 1,
            (false, None) => open_gap = Some(bucket),
            (false, Some(_)) => {}
        }
        bucket = next;
    }
    if let Some(gap_start) = open_gap {
        scan.gaps.push(Gap {
            start: gap_start,
            end: bucket,
        });
    }
    scan
}
