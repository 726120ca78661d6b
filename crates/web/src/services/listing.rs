//! Post-listing fetches with caching, fallback, and stale discard.
//!
//! The home page derives a [`ListingQuery`] from its address and asks
//! this service for the matching page of posts. Three policies live
//! here:
//!
//! - non-search pages are cached briefly (`moka`); searches always hit
//!   the backend
//! - a failed fetch serves the last successfully fetched listing when
//!   one exists (marked stale for the view), and an empty collection
//!   otherwise - the previous list stays on screen instead of an error
//! - the shared last-good snapshot applies in address-change order via a
//!   [`FetchSequencer`]: a slow response for a superseded query never
//!   overwrites the snapshot a newer query already wrote

use std::sync::{Arc, Mutex};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument, warn};

use devlog_core::{FetchSequencer, ListingQuery};

use crate::api::types::PostPage;
use crate::api::{ApiError, BlogClient};

/// Listing page cache TTL.
const PAGE_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of distinct listing pages kept cached.
const PAGE_CACHE_CAPACITY: u64 = 100;

/// A listing resolved for rendering.
#[derive(Debug, Clone)]
pub struct Listing {
    pub page: PostPage,
    /// True when this data is a fallback for a failed fetch.
    pub stale: bool,
}

/// Fetches listing pages and owns the shared last-good snapshot.
#[derive(Clone)]
pub struct ListingService {
    inner: Arc<ListingServiceInner>,
}

struct ListingServiceInner {
    client: BlogClient,
    pages: Cache<String, PostPage>,
    sequencer: FetchSequencer,
    last_good: Mutex<Option<PostPage>>,
}

impl ListingService {
    /// Create a listing service over a backend client.
    #[must_use]
    pub fn new(client: BlogClient) -> Self {
        let pages = Cache::builder()
            .max_capacity(PAGE_CACHE_CAPACITY)
            .time_to_live(PAGE_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ListingServiceInner {
                client,
                pages,
                sequencer: FetchSequencer::new(),
                last_good: Mutex::new(None),
            }),
        }
    }

    /// Resolve the listing for `query`, degrading on failure.
    #[instrument(skip(self), fields(page = query.page(), keyword = ?query.keyword()))]
    pub async fn load(&self, query: &ListingQuery) -> Listing {
        let ticket = self.inner.sequencer.begin();

        match self.fetch(query).await {
            Ok(page) => {
                // Older in-flight fetches must not clobber this snapshot
                if self.inner.sequencer.commit(ticket)
                    && let Ok(mut snapshot) = self.inner.last_good.lock()
                {
                    *snapshot = Some(page.clone());
                }
                Listing { page, stale: false }
            }
            Err(err) => {
                warn!(error = %err, "Listing fetch failed, serving fallback");
                let fallback = self
                    .inner
                    .last_good
                    .lock()
                    .ok()
                    .and_then(|snapshot| snapshot.clone());
                Listing {
                    page: fallback.unwrap_or_else(PostPage::empty),
                    stale: true,
                }
            }
        }
    }

    async fn fetch(&self, query: &ListingQuery) -> Result<PostPage, ApiError> {
        // Searches bypass the cache entirely
        if query.is_search() {
            return self.inner.client.list_posts(query).await;
        }

        let key = cache_key(query);
        if let Some(page) = self.inner.pages.get(&key).await {
            debug!("Cache hit for listing page");
            return Ok(page);
        }

        let page = self.inner.client.list_posts(query).await?;
        self.inner.pages.insert(key, page.clone()).await;
        Ok(page)
    }

    /// Drop all cached listing pages (called after post/category mutations).
    pub async fn invalidate(&self) {
        self.inner.pages.invalidate_all();
        self.inner.pages.run_pending_tasks().await;
    }
}

fn cache_key(query: &ListingQuery) -> String {
    format!(
        "posts:{}:{}",
        query
            .category()
            .map_or_else(String::new, |id| id.to_string()),
        query.page()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlog_core::ListingQuery;

    #[test]
    fn test_cache_key_distinguishes_pages() {
        let first = ListingQuery::from_params(None, Some(3), Some(1));
        let second = ListingQuery::from_params(None, Some(3), Some(2));
        assert_ne!(cache_key(&first), cache_key(&second));
    }

    #[test]
    fn test_cache_key_distinguishes_categories() {
        let all = ListingQuery::from_params(None, None, Some(1));
        let filtered = ListingQuery::from_params(None, Some(3), Some(1));
        assert_ne!(cache_key(&all), cache_key(&filtered));
    }
}
