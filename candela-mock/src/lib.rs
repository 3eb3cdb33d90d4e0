//! candela-mock
//!
//! A `CandleFetcher` that never touches the network. Candles are synthesized on the provider's
//! base grid from the bucket timestamp, so repeated loads are reproducible. A controller handle
//! scripts failures, stalls, listing dates and cancellation from the outside, and records every
//! request the loader issued.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::{
    CancellationToken, CandelaError, Candle, CandleFetcher, Exchange, FetchRequest,
    ensure_not_cancelled,
};

/// Instruction for how `fetch` should answer.
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Synthesize one candle per base bucket in the requested range.
    #[default]
    Synthetic,
    /// Return these candles verbatim, whatever the range.
    Return(Vec<Candle>),
    /// Fail immediately with the provided error.
    Fail(CandelaError),
    /// Stall until the token fires, then report `Cancelled`.
    Hang,
}

#[derive(Default)]
struct InternalState {
    behavior: MockBehavior,
    listing_ms: Option<i64>,
    latency: Option<Duration>,
    requests: Vec<FetchRequest>,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// Controller handle used by tests to drive a [`MockFetcher`].
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
}

impl MockController {
    /// Replace the answer for subsequent calls.
    pub async fn set_behavior(&self, behavior: MockBehavior) {
        self.state.lock().await.behavior = behavior;
    }

    /// Pretend the instrument started trading at `listing_ms`; earlier buckets come back empty.
    pub async fn set_listing(&self, listing_ms: Option<i64>) {
        self.state.lock().await.listing_ms = listing_ms;
    }

    /// Delay every answer by `latency`. The delay races the caller's token.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().await.latency = latency;
    }

    /// Fire `token` as soon as the `n`-th call has been answered.
    pub async fn cancel_after(&self, n: usize, token: CancellationToken) {
        self.state.lock().await.cancel_after = Some((n, token));
    }

    /// Number of `fetch` calls observed so far.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    /// Every request seen, in call order.
    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Forget recorded requests and restore default behavior.
    pub async fn reset(&self) {
        *self.state.lock().await = InternalState::default();
    }
}

/// Deterministic price for the bucket starting at `start`.
fn price_at(start: i64, step: i64) -> f64 {
    let k = start.div_euclid(step.max(1)).rem_euclid(200);
    100.0 + k as f64 * 0.5
}

/// One synthetic candle per base bucket of `req` that starts in `[max(start, listing), end)`.
#[must_use]
pub fn synthetic_candles(req: &FetchRequest, listing_ms: Option<i64>) -> Vec<Candle> {
    let step = req.base_interval_ms.max(1);
    let from = req.start_ms.max(listing_ms.unwrap_or(i64::MIN));
    let mut t = from.div_euclid(step) * step;
    if t < from {
        t += step;
    }
    let asset = req.display_symbol();
    let mut out = Vec::new();
    while t < req.end_ms {
        let p = price_at(t, step);
        out.push(Candle {
            start: t,
            end: t + step,
            open: p,
            high: p + 1.0,
            low: p - 1.0,
            close: p + 0.25,
            volume: 1.0,
            trades: 1,
            asset: asset.clone(),
            interval: req.interval_label.clone(),
        });
        t += step;
    }
    out
}

/// Mock fetcher for one exchange.
pub struct MockFetcher {
    exchange: Exchange,
    state: Arc<Mutex<InternalState>>,
}

impl MockFetcher {
    /// Create a mock fetcher for `exchange` and its controller.
    #[must_use]
    pub fn new_with_controller(exchange: Exchange) -> (Arc<dyn CandleFetcher>, MockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = MockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { exchange, state });
        (me as Arc<dyn CandleFetcher>, controller)
    }
}

#[async_trait]
impl CandleFetcher for MockFetcher {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn fetch(
        &self,
        req: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candle>, CandelaError> {
        ensure_not_cancelled(cancel)?;
        let (behavior, listing, latency, trigger) = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            let n = guard.requests.len();
            let trigger = guard
                .cancel_after
                .as_ref()
                .filter(|(at, _)| *at == n)
                .map(|(_, token)| token.clone());
            (guard.behavior.clone(), guard.listing_ms, guard.latency, trigger)
        };

        if let Some(latency) = latency {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(CandelaError::Cancelled),
                () = tokio::time::sleep(latency) => {}
            }
        }

        let out = match behavior {
            MockBehavior::Synthetic => Ok(synthetic_candles(req, listing)),
            MockBehavior::Return(candles) => Ok(candles),
            MockBehavior::Fail(err) => Err(err),
            MockBehavior::Hang => {
                cancel.cancelled().await;
                Err(CandelaError::Cancelled)
            }
        };
        if let Some(token) = trigger {
            token.cancel();
        }
        out
    }
}
