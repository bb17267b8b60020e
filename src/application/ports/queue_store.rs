use crate::domain::entities::PendingWrite;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Storage key for the pending-write queue (a JSON array).
pub const OFFLINE_QUEUE_KEY: &str = "offlineQuote";
/// Storage key for the last-known product listing.
pub const PRODUCTS_KEY: &str = "products";
/// Storage key for the last-known first page of the quote listing.
pub const QUOTES_KEY: &str = "quotes";

/// Durable key-value store holding the pending-write queue and the cached
/// read model. All operations are atomic with respect to concurrent
/// in-process callers; the queue survives process restarts.
///
/// Reads fail open: corrupt or unparsable stored data is treated as empty
/// rather than raising, and the corrupt value is overwritten by the next
/// successful write. A failed write is fatal to that operation, since
/// losing a queued write is a data-loss incident, not something to
/// swallow.
#[async_trait]
pub trait DurableQueueStore: Send + Sync {
    async fn append(&self, write: PendingWrite) -> Result<(), AppError>;
    /// Read the full queue in FIFO order without removing anything.
    async fn load_all(&self) -> Result<Vec<PendingWrite>, AppError>;
    /// Atomically overwrite the queue with the given sequence.
    async fn replace_all(&self, writes: Vec<PendingWrite>) -> Result<(), AppError>;
    async fn get_cached(&self, key: &str) -> Result<Option<Value>, AppError>;
    async fn set_cached(&self, key: &str, value: Value) -> Result<(), AppError>;
}
