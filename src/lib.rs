pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::connectivity::ConnectivityMonitor;
pub use application::ports::queue_store::DurableQueueStore;
pub use application::ports::remote::RemoteGateway;
pub use application::services::product_catalog::ProductCatalog;
pub use application::services::query_cache::PaginatedQueryCache;
pub use application::services::sync_engine::{SyncEngine, SyncReport, WriteOutcome};
pub use domain::entities::pending_write::PendingWrite;
pub use domain::entities::quote::{CustomerInfo, Quote, QuoteDraft, QuoteItem, QuoteSummary};
pub use domain::value_objects::connectivity::ConnectivityState;
pub use domain::value_objects::quote_filter::QuoteFilter;
pub use domain::value_objects::quote_status::QuoteStatus;
pub use infrastructure::connectivity::{NetInfoMonitor, SensorHandle};
pub use infrastructure::remote::HttpGateway;
pub use infrastructure::storage::SqliteQueueStore;
pub use shared::config::RemoteConfig;
pub use shared::error::AppError;

/// Install the default tracing subscriber for hosts that do not bring
/// their own. Safe to call more than once.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotesync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
