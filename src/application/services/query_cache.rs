use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::queue_store::{DurableQueueStore, QUOTES_KEY};
use crate::application::ports::remote::RemoteGateway;
use crate::domain::entities::quote::QuoteSummary;
use crate::domain::entities::QuotePage;
use crate::domain::value_objects::QuoteFilter;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CachedPage {
    page: QuotePage,
    fetched_at: DateTime<Utc>,
}

/// Client-side page cache for the quote listing.
///
/// Pages are keyed by the server-reported page number and immutable once
/// stored unless a refresh is requested. While offline there is no
/// pagination: the single synthetic page is built from the pending-write
/// queue, falling back to the last-known first page of the server listing.
pub struct PaginatedQueryCache {
    monitor: Arc<dyn ConnectivityMonitor>,
    store: Arc<dyn DurableQueueStore>,
    gateway: Arc<dyn RemoteGateway>,
    pages: RwLock<HashMap<u32, CachedPage>>,
}

impl PaginatedQueryCache {
    pub fn new(
        monitor: Arc<dyn ConnectivityMonitor>,
        store: Arc<dyn DurableQueueStore>,
        gateway: Arc<dyn RemoteGateway>,
    ) -> Self {
        Self {
            monitor,
            store,
            gateway,
            pages: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch or serve page `page` (1-based).
    ///
    /// A cache hit without `refresh` performs zero I/O. Cancellation
    /// surfaces as `AppError::Aborted` for the caller's boundary to
    /// absorb (navigation teardown is not an error condition).
    pub async fn get_page(
        &self,
        page: u32,
        refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<QuotePage, AppError> {
        if page < 1 {
            return Err(AppError::Validation(
                "page number must be greater than 0".to_string(),
            ));
        }

        if !refresh {
            if let Some(hit) = self.pages.read().await.get(&page) {
                let age_secs = (Utc::now() - hit.fetched_at).num_seconds();
                debug!(page, age_secs, "quote page served from cache");
                return Ok(hit.page.clone());
            }
        }

        if self.monitor.current().is_effective() {
            self.fetch_page(page, cancel).await
        } else {
            self.offline_page().await
        }
    }

    /// Drop every cached page (pull-to-refresh).
    pub async fn invalidate(&self) {
        self.pages.write().await.clear();
    }

    /// Narrow a page's items with the given filter. Pure projection over
    /// already-fetched data; never triggers a fetch.
    pub fn apply_filter(&self, page: &QuotePage, filter: &QuoteFilter) -> Vec<QuoteSummary> {
        filter.apply(&page.items)
    }

    async fn fetch_page(&self, page: u32, cancel: &CancellationToken) -> Result<QuotePage, AppError> {
        let fetched = self.gateway.list_quotes(page, cancel).await?;

        // The server clamps out-of-range requests; key the entry by what
        // it actually returned.
        self.pages.write().await.insert(
            fetched.page_number,
            CachedPage {
                page: fetched.clone(),
                fetched_at: Utc::now(),
            },
        );

        if fetched.page_number == 1 {
            // Keep the first page available for offline listings. Best
            // effort: the fetched page is still valid if the cache write
            // fails.
            match serde_json::to_value(&fetched.items) {
                Ok(snapshot) => {
                    if let Err(err) = self.store.set_cached(QUOTES_KEY, snapshot).await {
                        warn!(%err, "failed to persist quote listing snapshot");
                    }
                }
                Err(err) => warn!(%err, "failed to serialize quote listing snapshot"),
            }
        }

        Ok(fetched)
    }

    async fn offline_page(&self) -> Result<QuotePage, AppError> {
        let queue = self.store.load_all().await?;
        if !queue.is_empty() {
            let items = queue.iter().map(|write| write.to_summary()).collect();
            return Ok(QuotePage::offline(items));
        }

        // Nothing pending: serve the last-known server listing, failing
        // open to an empty page.
        let items = match self.store.get_cached(QUOTES_KEY).await? {
            Some(snapshot) => serde_json::from_value(snapshot).unwrap_or_else(|err| {
                warn!(%err, "corrupt quote listing snapshot, serving empty page");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(QuotePage::offline(items))
    }
}
