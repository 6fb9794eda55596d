//! Bounded paginated collector.
//!
//! The platform has no "last N activities of mode X" query, only a linear
//! page-by-page history walk. [`collect`] synthesizes the top-N query with an
//! explicit stop condition and a hard page ceiling.
//
//  Before every fetch:
//    items >= target          → TargetReached (first `target` items kept)
//    page index == max_pages  → BudgetSpent
//  After every fetch:
//    empty or absent page     → Exhausted
//    fetch error              → Failed (logged, never propagated)

use async_trait::async_trait;

use crate::error::UpstreamError;

/// A paged, ordered data source.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Fetch page `page` (0-based). `Ok(None)` and `Ok(Some(vec![]))` both
    /// mean the source is exhausted.
    async fn fetch_page(&self, page: u32) -> Result<Option<Vec<Self::Item>>, UpstreamError>;

    /// Short description used in log lines.
    fn describe(&self) -> String {
        "page source".into()
    }
}

/// Bounds of one search. Immutable once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub target_count: usize,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    Exhausted,
    Failed,
    BudgetSpent,
}

#[derive(Debug, Clone)]
pub struct CollectorResult<T> {
    /// At most `target_count` items, in source order.
    pub items: Vec<T>,
    pub stop: StopReason,
    pub pages_fetched: u32,
}

impl<T> CollectorResult<T> {
    /// The source ran dry before the target was reached.
    pub fn exhausted(&self) -> bool {
        self.stop == StopReason::Exhausted
    }
}

/// Walk `source` page by page until one of the stop conditions holds.
///
/// Pages are strictly sequential: the next fetch is only issued once the
/// previous page has been inspected.
pub async fn collect<S>(source: &S, request: SearchRequest) -> CollectorResult<S::Item>
where
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    let mut page = 0u32;

    let stop = loop {
        if items.len() >= request.target_count {
            break StopReason::TargetReached;
        }
        if page >= request.max_pages {
            break StopReason::BudgetSpent;
        }

        let fetched = source.fetch_page(page).await;
        page += 1;

        match fetched {
            Ok(Some(batch)) if !batch.is_empty() => items.extend(batch),
            Ok(_) => break StopReason::Exhausted,
            Err(e) => {
                log::warn!(
                    "{}: page {} failed, keeping {} items: {e}",
                    source.describe(),
                    page - 1,
                    items.len()
                );
                break StopReason::Failed;
            }
        }
    };

    items.truncate(request.target_count);
    log::debug!(
        "{}: stopped ({stop:?}) after {page} pages with {} items",
        source.describe(),
        items.len()
    );

    CollectorResult {
        items,
        stop,
        pages_fetched: page,
    }
}
