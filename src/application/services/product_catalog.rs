use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::queue_store::{DurableQueueStore, PRODUCTS_KEY};
use crate::application::ports::remote::RemoteGateway;
use crate::domain::entities::Product;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Reference-data catalog for offline item selection.
///
/// Online refreshes replace the stored listing wholesale (never a merge);
/// offline reads come from the durable cache and fail open to empty.
pub struct ProductCatalog {
    monitor: Arc<dyn ConnectivityMonitor>,
    store: Arc<dyn DurableQueueStore>,
    gateway: Arc<dyn RemoteGateway>,
}

impl ProductCatalog {
    pub fn new(
        monitor: Arc<dyn ConnectivityMonitor>,
        store: Arc<dyn DurableQueueStore>,
        gateway: Arc<dyn RemoteGateway>,
    ) -> Self {
        Self {
            monitor,
            store,
            gateway,
        }
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<Vec<Product>, AppError> {
        if !self.monitor.current().is_effective() {
            return self.cached_products().await;
        }

        match self.gateway.list_products(cancel).await {
            Ok(products) => {
                // Full replace. The fetched set is still valid if the
                // cache write fails.
                match serde_json::to_value(&products) {
                    Ok(snapshot) => {
                        if let Err(err) = self.store.set_cached(PRODUCTS_KEY, snapshot).await {
                            warn!(%err, "failed to persist product listing");
                        }
                    }
                    Err(err) => warn!(%err, "failed to serialize product listing"),
                }
                Ok(products)
            }
            Err(AppError::Aborted) => {
                // Product refresh is a background concern; cancellation
                // falls back to the last-known set.
                warn!("product refresh aborted, serving cached listing");
                self.cached_products().await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn cached_products(&self) -> Result<Vec<Product>, AppError> {
        let products = match self.store.get_cached(PRODUCTS_KEY).await? {
            Some(snapshot) => serde_json::from_value(snapshot).unwrap_or_else(|err| {
                warn!(%err, "corrupt product listing, serving empty catalog");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(products)
    }
}
