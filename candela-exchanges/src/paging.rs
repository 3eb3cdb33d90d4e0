//! Cursor loops shared by the fetchers.
//!
//! Every loop checks the token before each request. Cursor pagers stop on an empty page, a short
//! page or a cursor that fails to move; page size and cursor come from the raw rows, so a dropped
//! malformed row never ends paging early. Window pagers walk the whole range, since an empty window
//! only means that stretch has no bars.
use std::future::Future;

use candela_core::{CancellationToken, CandelaError, Candle, FetchRequest, ensure_not_cancelled};

use crate::parse::Page;

/// Warn and return false when `next` does not move past `prev` in the paging direction.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn advances(req: &FetchRequest, prev: i64, next: i64, forward: bool) -> bool {
    let ok = if forward { next > prev } else { next < prev };
    if !ok {
        #[cfg(feature = "tracing")]
        tracing::warn!(source = %req.source, prev, next, "pagination cursor did not advance");
    }
    ok
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_page(req: &FetchRequest, cursor: i64, page: &Page) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        source = %req.source,
        interval = req.interval,
        cursor,
        rows = page.rows,
        candles = page.candles.len(),
        "page fetched"
    );
}

fn span_ms(req: &FetchRequest, limit: usize) -> i64 {
    req.base_interval_ms
        .saturating_mul(i64::try_from(limit).unwrap_or(i64::MAX))
        .max(1)
}

/// Start-cursor pagination: each page starts where the previous one ended.
///
/// `fetch_page(cursor)` returns up to `limit` rows starting at or after `cursor` (ms).
pub(crate) async fn forward_pages<F, Fut>(
    req: &FetchRequest,
    limit: usize,
    cancel: &CancellationToken,
    mut fetch_page: F,
) -> Result<Vec<Candle>, CandelaError>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<Page, CandelaError>>,
{
    let mut out = Vec::new();
    let mut cursor = req.start_ms;
    while cursor < req.end_ms {
        ensure_not_cancelled(cancel)?;
        let page = fetch_page(cursor).await?;
        log_page(req, cursor, &page);
        let (rows, span) = (page.rows, page.span);
        out.extend(page.candles);
        let Some((_, newest)) = span else { break };
        if rows < limit {
            break;
        }
        let next = newest.saturating_add(1);
        if !advances(req, cursor, next, true) {
            break;
        }
        cursor = next;
    }
    Ok(out)
}

/// End-cursor pagination walking back from `req.end_ms`.
///
/// `fetch_page(cursor)` returns up to `limit` rows starting at or before `cursor` (ms, inclusive)
/// and not before `req.start_ms`.
pub(crate) async fn backward_pages<F, Fut>(
    req: &FetchRequest,
    limit: usize,
    cancel: &CancellationToken,
    mut fetch_page: F,
) -> Result<Vec<Candle>, CandelaError>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<Page, CandelaError>>,
{
    let mut out = Vec::new();
    let mut cursor = req.end_ms - 1;
    while cursor >= req.start_ms {
        ensure_not_cancelled(cancel)?;
        let page = fetch_page(cursor).await?;
        log_page(req, cursor, &page);
        let (rows, span) = (page.rows, page.span);
        out.extend(page.candles);
        let Some((oldest, _)) = span else { break };
        if rows < limit || oldest <= req.start_ms {
            break;
        }
        let next = oldest - 1;
        if !advances(req, cursor, next, false) {
            break;
        }
        cursor = next;
    }
    Ok(out)
}

/// Fixed windows of `limit` buckets walking forward from `req.start_ms` to `req.end_ms`.
///
/// `fetch_window(from, to)` returns the rows starting in `[from, to)` (ms). Empty and short
/// windows do not stop the walk.
pub(crate) async fn forward_windows<F, Fut>(
    req: &FetchRequest,
    limit: usize,
    cancel: &CancellationToken,
    mut fetch_window: F,
) -> Result<Vec<Candle>, CandelaError>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<Page, CandelaError>>,
{
    let span = span_ms(req, limit);
    let mut out = Vec::new();
    let mut cursor = req.start_ms;
    while cursor < req.end_ms {
        ensure_not_cancelled(cancel)?;
        let to = cursor.saturating_add(span).min(req.end_ms);
        let page = fetch_window(cursor, to).await?;
        log_page(req, cursor, &page);
        out.extend(page.candles);
        cursor = to;
    }
    Ok(out)
}

/// Fixed windows of `limit` buckets walking backward from `req.end_ms` to `req.start_ms`.
///
/// `fetch_window(from, to)` returns the rows starting in `[from, to)` (ms). Empty and short
/// windows do not stop the walk.
pub(crate) async fn backward_windows<F, Fut>(
    req: &FetchRequest,
    limit: usize,
    cancel: &CancellationToken,
    mut fetch_window: F,
) -> Result<Vec<Candle>, CandelaError>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<Page, CandelaError>>,
{
    let span = span_ms(req, limit);
    let mut out = Vec::new();
    let mut cursor = req.end_ms;
    while cursor > req.start_ms {
        ensure_not_cancelled(cancel)?;
        let from = cursor.saturating_sub(span).max(req.start_ms);
        let page = fetch_window(from, cursor).await?;
        log_page(req, from, &page);
        out.extend(page.candles);
        cursor = from;
    }
    Ok(out)
}
