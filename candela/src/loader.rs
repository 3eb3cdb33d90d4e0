use candela_core::{
    CancellationToken, CandelaError, Candle, DataSource, FetchRequest, TimeFrame, aggregate,
    align_range, ensure_not_cancelled, normalize, resolve_or_err, resolve_symbol,
};

use crate::CandleLoader;

/// Callback receiving the cached candles before any gap is fetched.
pub type SnapshotFn = dyn Fn(&[Candle]) + Send + Sync;

/// One `load_candles` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Provider and market.
    pub source: DataSource,
    /// Requested bucket width.
    pub timeframe: TimeFrame,
    /// Range start, epoch milliseconds.
    pub start_ms: i64,
    /// Range end, epoch milliseconds.
    pub end_ms: i64,
    /// Base asset (`BTC`) or compound symbol (`BTC-USDT`).
    pub asset: String,
    /// Quote asset; the configured default applies when absent.
    pub quote: Option<String>,
}

impl LoadRequest {
    /// Request for `asset` against the default quote.
    #[must_use]
    pub fn new(
        source: DataSource,
        timeframe: TimeFrame,
        start_ms: i64,
        end_ms: i64,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            source,
            timeframe,
            start_ms,
            end_ms,
            asset: asset.into(),
            quote: None,
        }
    }

    /// Set the quote asset.
    #[must_use]
    pub fn quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }
}

impl CandleLoader {
    /// Padded, clamped and grid-aligned range actually loaded for `req`.
    ///
    /// The range grows by `prefetch_buckets` bucket widths on each side and its end is clamped to
    /// now. A range that ends up empty becomes the trailing `default_window`.
    #[must_use]
    pub fn effective_range(&self, req: &LoadRequest) -> (i64, i64) {
        let step = req.timeframe.duration_ms();
        let pad = step.saturating_mul(self.cfg.prefetch_buckets);
        let now = self.now_ms();
        let mut start = req.start_ms.saturating_sub(pad);
        let mut end = req.end_ms.saturating_add(pad).min(now);
        if end <= start {
            end = now;
            start = now.saturating_sub(self.cfg.default_window_ms());
        }
        align_range(start, end, step)
    }

    /// Load candles for `req`, fetching only the buckets missing from the cache.
    ///
    /// Returns every candle cached for the asset on `req.timeframe`, sorted by start. A blank
    /// asset yields an empty list without touching the cache. `on_snapshot` receives the cached
    /// candles before any network call. Gaps are fetched in order; firing `cancel` aborts with
    /// `Cancelled` and keeps the gaps already written.
    ///
    /// # Errors
    /// - `UnsupportedTimeframe` when the provider cannot serve or synthesize the timeframe.
    /// - `UnsupportedSource` when no fetcher is registered for the exchange.
    /// - `Cancelled` when `cancel` fires.
    /// - Any transport, HTTP, provider or decoding error raised by the fetcher.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::load_candles",
            skip(self, req, on_snapshot, cancel),
            fields(
                source = %req.source,
                timeframe = %req.timeframe,
                asset = %req.asset,
                start = req.start_ms,
                end = req.end_ms,
            ),
        )
    )]
    pub async fn load_candles(
        &self,
        req: &LoadRequest,
        on_snapshot: Option<&SnapshotFn>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Candle>, CandelaError> {
        if req.asset.trim().is_empty() {
            return Ok(Vec::new());
        }
        let cancel = cancel.cloned().unwrap_or_default();
        let quote = req
            .quote
            .as_deref()
            .unwrap_or(self.cfg.default_quote.as_str());
        let owner = resolve_symbol(&req.asset, quote, "-");
        let step = req.timeframe.duration_ms();
        let (start, end) = self.effective_range(req);

        let cache = self.cache.get_timeframe_cache(req.timeframe, &owner).await;
        let scan = cache.scan(start, end, step).await;
        let cached = cache.snapshot().await;
        if let Some(cb) = on_snapshot {
            cb(&cached);
        }
        if scan.gaps.is_empty() && !cached.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(candles = cached.len(), "cache hit");
            return Ok(cached);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            gaps = scan.gaps.len(),
            cached_buckets = scan.cached_buckets,
            "filling gaps"
        );

        let plan = resolve_or_err(req.source, req.timeframe)?;
        let fetcher = self.fetchers.get(req.source.exchange).ok_or_else(|| {
            CandelaError::unsupported_source(
                req.source.exchange.as_str(),
                req.source.market_type.as_str(),
            )
        })?;

        for gap in &scan.gaps {
            ensure_not_cancelled(&cancel)?;
            let fetch = FetchRequest::from_plan(
                req.source,
                req.asset.trim(),
                quote,
                gap.start,
                gap.end,
                &plan,
            )?;
            let raw = fetcher.fetch(&fetch, &cancel).await?;
            let mut candles = normalize(raw, gap.start, gap.end);
            if plan.group_size > 1 {
                candles = aggregate(candles, step, &owner, req.timeframe.label());
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                gap_start = gap.start,
                gap_end = gap.end,
                candles = candles.len(),
                "gap filled"
            );
            cache.extend(candles).await;
        }

        Ok(cache.snapshot().await)
    }
}
