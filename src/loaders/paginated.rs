//! All-transactions pager
//!
//! Walks the paginated endpoint one page per call. The pager keeps only the
//! continuation cursor; accumulating pages is the caller's job.

use tokio::sync::RwLock;
use tracing::debug;

use crate::api::backend::OP_PAGINATED_TRANSACTIONS;
use crate::api::{ApiError, Page, PageCursor, PaginatedRequestParams, Transaction};
use crate::cache::RequestCache;

/// Where the pager will read next
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    /// Nothing fetched yet; the next call reads the first page
    Start,
    /// The next call reads this cursor
    Next(PageCursor),
    /// The last page has been fetched
    Exhausted,
}

struct PagerState {
    cursor: CursorState,
    /// Bumped on every invalidation
    epoch: u64,
}

/// Pager over all transactions
pub struct TransactionPager {
    /// Request cache namespace for page calls
    cache: RequestCache,
    state: RwLock<PagerState>,
}

impl TransactionPager {
    pub fn new(cache: RequestCache) -> Self {
        Self {
            cache,
            state: RwLock::new(PagerState {
                cursor: CursorState::Start,
                epoch: 0,
            }),
        }
    }

    /// Fetch the page at the current cursor and advance past it
    ///
    /// Returns `Ok(None)` without calling the backend once the last page has
    /// been fetched. On failure the cursor is left where it was. A fetch that
    /// overlaps an invalidation still returns its page but does not move the
    /// reset cursor.
    pub async fn fetch_all(&self) -> Result<Option<Page<Transaction>>, ApiError> {
        let (page, epoch) = {
            let state = self.state.read().await;
            let page = match &state.cursor {
                CursorState::Exhausted => {
                    debug!("All transaction pages fetched");
                    return Ok(None);
                }
                CursorState::Start => None,
                CursorState::Next(cursor) => Some(cursor.clone()),
            };
            (page, state.epoch)
        };

        debug!(cursor = ?page, "Fetching transactions page");
        let fetched: Page<Transaction> = self
            .cache
            .fetch_cached(OP_PAGINATED_TRANSACTIONS, &PaginatedRequestParams { page })
            .await?;

        let mut state = self.state.write().await;
        if state.epoch == epoch {
            state.cursor = match &fetched.next_page {
                Some(next) => CursorState::Next(next.clone()),
                None => CursorState::Exhausted,
            };
        } else {
            debug!("Pager invalidated during fetch, keeping reset cursor");
        }

        Ok(Some(fetched))
    }

    /// Restart from the first page and drop cached pages
    pub async fn invalidate_data(&self) {
        {
            let mut state = self.state.write().await;
            state.cursor = CursorState::Start;
            state.epoch += 1;
        }
        self.cache.invalidate_all();
    }

    /// Current cursor
    pub async fn cursor_state(&self) -> CursorState {
        self.state.read().await.cursor.clone()
    }

    /// Whether a page call is outstanding
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{three_transaction_backend, CountingBackend};
    use serde_json::json;
    use std::sync::Arc;

    fn pager(backend: &Arc<CountingBackend>) -> TransactionPager {
        TransactionPager::new(RequestCache::new("pages", backend.clone()))
    }

    fn ids(page: &Page<Transaction>) -> Vec<&str> {
        page.data.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_walks_pages_then_stops() {
        let backend = Arc::new(three_transaction_backend());
        let pager = pager(&backend);
        assert_eq!(pager.cursor_state().await, CursorState::Start);

        let first = pager.fetch_all().await.unwrap().unwrap();
        assert_eq!(ids(&first), ["t1", "t2"]);
        assert_eq!(pager.cursor_state().await, CursorState::Next(PageCursor::from(1)));

        let second = pager.fetch_all().await.unwrap().unwrap();
        assert_eq!(ids(&second), ["t3"]);
        assert!(second.next_page.is_none());
        assert_eq!(pager.cursor_state().await, CursorState::Exhausted);

        assert!(pager.fetch_all().await.unwrap().is_none());
        assert_eq!(backend.calls(OP_PAGINATED_TRANSACTIONS), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_cursor() {
        let backend = Arc::new(three_transaction_backend());
        let pager = pager(&backend);
        pager.fetch_all().await.unwrap();

        backend.fail_next(OP_PAGINATED_TRANSACTIONS, 1);
        assert!(pager.fetch_all().await.is_err());
        assert_eq!(pager.cursor_state().await, CursorState::Next(PageCursor::from(1)));

        let retried = pager.fetch_all().await.unwrap().unwrap();
        assert_eq!(ids(&retried), ["t3"]);
    }

    #[tokio::test]
    async fn test_invalidate_restarts_from_first_page() {
        let backend = Arc::new(three_transaction_backend());
        let pager = pager(&backend);
        pager.fetch_all().await.unwrap();
        pager.fetch_all().await.unwrap();

        pager.invalidate_data().await;
        assert_eq!(pager.cursor_state().await, CursorState::Start);

        let first = pager.fetch_all().await.unwrap().unwrap();
        assert_eq!(ids(&first), ["t1", "t2"]);
        // The cached first page was dropped with the namespace
        assert_eq!(backend.calls(OP_PAGINATED_TRANSACTIONS), 3);
    }

    #[tokio::test]
    async fn test_fetch_overlapping_invalidation_keeps_reset_cursor() {
        let backend = Arc::new(three_transaction_backend());
        let pager = pager(&backend);
        let release = backend.hold(OP_PAGINATED_TRANSACTIONS, json!({}));

        let (fetched, ()) = tokio::join!(pager.fetch_all(), async {
            while backend.calls(OP_PAGINATED_TRANSACTIONS) == 0 {
                tokio::task::yield_now().await;
            }
            pager.invalidate_data().await;
            release.notify_one();
        });

        assert!(fetched.unwrap().is_some());
        assert_eq!(pager.cursor_state().await, CursorState::Start);
    }
}
