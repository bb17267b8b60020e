pub mod product_catalog;
pub mod query_cache;
pub mod sync_engine;

pub use product_catalog::ProductCatalog;
pub use query_cache::PaginatedQueryCache;
pub use sync_engine::{SyncEngine, SyncReport, WriteOutcome};
